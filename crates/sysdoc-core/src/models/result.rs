use serde::{Deserialize, Serialize};

use super::candidate::RetrievalCandidate;
use super::chunk::ContentType;

/// Why an item is in the final list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ResultRole {
    Primary,
    CrossReference {
        /// The primary chunk that pulled this one in.
        origin: String,
        /// Jaccard overlap of the two entity sets.
        relevance: f64,
        shared_entities: Vec<String>,
    },
}

/// One chunk of the final, ordered context handed to generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub candidate: RetrievalCandidate,
    pub content: String,
    pub content_type: ContentType,
    pub section_path: Vec<String>,
    pub role: ResultRole,
}

impl ResultItem {
    pub fn chunk_id(&self) -> &str {
        &self.candidate.chunk_id
    }

    pub fn document_id(&self) -> &str {
        &self.candidate.document_id
    }

    pub fn is_primary(&self) -> bool {
        matches!(self.role, ResultRole::Primary)
    }
}

/// Source attribution, one per document in the final list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub document_id: String,
    pub filename: String,
    /// Section of the best-scoring chunk of this document.
    pub section_path: Vec<String>,
}

/// Output of the query pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssembledResult {
    pub items: Vec<ResultItem>,
    pub citations: Vec<Citation>,
    /// True when an external scorer failed and a fallback ordering was served.
    pub degraded: bool,
}

impl AssembledResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn primaries(&self) -> impl Iterator<Item = &ResultItem> {
        self.items.iter().filter(|i| i.is_primary())
    }

    pub fn cross_references(&self) -> impl Iterator<Item = &ResultItem> {
        self.items.iter().filter(|i| !i.is_primary())
    }
}
