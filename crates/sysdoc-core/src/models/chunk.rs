use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::EntityRef;
use super::structure::NodeKind;
use crate::constants::{CHUNK_ID_HEX_LEN, CHUNK_ID_PREFIX, SECTION_PATH_SEPARATOR};

/// What kind of content a chunk holds. Drives extraction rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Table,
    CodeBlock,
}

impl From<NodeKind> for ContentType {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Table => ContentType::Table,
            NodeKind::CodeBlock => ContentType::CodeBlock,
            NodeKind::Heading | NodeKind::Paragraph | NodeKind::ListItem => ContentType::Text,
        }
    }
}

/// Document classification, assigned at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    ApiSpec,
    TableSchema,
    SystemDesign,
    #[default]
    General,
}

impl DocType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::ApiSpec => "api_spec",
            DocType::TableSchema => "table_schema",
            DocType::SystemDesign => "system_design",
            DocType::General => "general",
        }
    }
}

/// Document-level attributes copied onto every chunk, used by query filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub doc_type: DocType,
    pub tags: Vec<String>,
    /// Opaque passthrough for citations.
    pub filename: String,
}

/// An indexable unit of document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Content-derived id, see [`Chunk::compute_id`].
    pub chunk_id: String,
    pub document_id: String,
    pub content: String,
    pub content_type: ContentType,
    pub section_path: Vec<String>,
    /// Append-only during extraction, frozen once the chunk is indexed.
    pub entities: BTreeSet<EntityRef>,
    /// Populated by the embedder, `None` until embedded.
    pub dense_vector: Option<Vec<f32>>,
    /// Length in chars of the prefix repeated from the previous chunk.
    #[serde(default)]
    pub overlap_chars: usize,
    #[serde(default)]
    pub metadata: ChunkMetadata,
    pub created_at: DateTime<Utc>,
}

impl Chunk {
    /// Deterministic id from the owning document, position and body.
    pub fn compute_id(document_id: &str, ordinal: usize, body: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(document_id.as_bytes());
        hasher.update(&[0]);
        hasher.update(&(ordinal as u64).to_le_bytes());
        hasher.update(body.as_bytes());
        let hex = hasher.finalize().to_hex();
        format!("{CHUNK_ID_PREFIX}{}", &hex[..CHUNK_ID_HEX_LEN])
    }

    /// Content without the overlap prefix.
    pub fn body(&self) -> &str {
        match self.content.char_indices().nth(self.overlap_chars) {
            Some((idx, _)) => &self.content[idx..],
            None if self.overlap_chars == 0 => &self.content,
            None => "",
        }
    }

    /// Length of the body in chars.
    pub fn body_chars(&self) -> usize {
        self.body().chars().count()
    }

    /// The nearest heading above this chunk, if any.
    pub fn immediate_heading(&self) -> Option<&str> {
        self.section_path.last().map(String::as_str)
    }

    pub fn section_label(&self) -> String {
        self.section_path.join(SECTION_PATH_SEPARATOR)
    }

    /// Text handed to the embedder: section path followed by the content.
    pub fn embedding_text(&self) -> String {
        if self.section_path.is_empty() {
            self.content.clone()
        } else {
            format!("{}\n{}", self.section_label(), self.content)
        }
    }

    /// Canonical names of all entities on this chunk.
    pub fn canonical_names(&self) -> BTreeSet<&str> {
        self.entities
            .iter()
            .map(|e| e.canonical_name.as_str())
            .collect()
    }

    pub fn has_entity(&self, canonical_name: &str) -> bool {
        self.entities
            .iter()
            .any(|e| e.canonical_name == canonical_name)
    }

    /// Append extracted entities. Existing entries are never removed.
    pub fn add_entities(&mut self, entities: impl IntoIterator<Item = EntityRef>) {
        self.entities.extend(entities);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityKind;

    fn chunk(content: &str, overlap: usize) -> Chunk {
        Chunk {
            chunk_id: Chunk::compute_id("d", 0, content),
            document_id: "d".to_string(),
            content: content.to_string(),
            content_type: ContentType::Text,
            section_path: vec!["A".to_string(), "B".to_string()],
            entities: BTreeSet::new(),
            dense_vector: None,
            overlap_chars: overlap,
            metadata: ChunkMetadata::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn compute_id_is_deterministic_and_position_sensitive() {
        let a = Chunk::compute_id("doc", 0, "hello");
        assert_eq!(a, Chunk::compute_id("doc", 0, "hello"));
        assert_ne!(a, Chunk::compute_id("doc", 1, "hello"));
        assert_ne!(a, Chunk::compute_id("other", 0, "hello"));
        assert!(a.starts_with(CHUNK_ID_PREFIX));
        assert_eq!(a.len(), CHUNK_ID_PREFIX.len() + CHUNK_ID_HEX_LEN);
    }

    #[test]
    fn body_strips_overlap_on_char_boundaries() {
        let c = chunk("欄位abc", 2);
        assert_eq!(c.body(), "abc");
        assert_eq!(chunk("abc", 0).body(), "abc");
    }

    #[test]
    fn embedding_text_prefixes_section_path() {
        let c = chunk("body", 0);
        assert_eq!(c.embedding_text(), "A > B\nbody");
        assert_eq!(c.immediate_heading(), Some("B"));
    }

    #[test]
    fn entities_are_append_only_and_deduplicated() {
        let mut c = chunk("x", 0);
        let e = EntityRef::new(EntityKind::TableName, "users", "users");
        c.add_entities(vec![e.clone()]);
        c.add_entities(vec![e]);
        assert_eq!(c.entities.len(), 1);
        assert!(c.has_entity("users"));
    }
}
