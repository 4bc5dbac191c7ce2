use std::collections::{BTreeSet, HashSet};

use sysdoc_core::config::ExtractionConfig;
use sysdoc_core::models::{Chunk, ContentType, EntityKind, EntityRef};
use tracing::{debug, warn};

use crate::patterns::all_patterns;
use crate::rules::{domain, endpoint, table};

/// Extract with default configuration.
pub fn extract(chunk: &Chunk) -> BTreeSet<EntityRef> {
    EntityExtractor::default().extract(chunk)
}

/// Entity extraction over chunks. A pure function of the chunk body,
/// content type and immediate heading.
#[derive(Debug, Clone, Default)]
pub struct EntityExtractor {
    config: ExtractionConfig,
}

impl EntityExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        let broken: Vec<&str> = all_patterns()
            .iter()
            .filter(|(_, pattern)| pattern.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !broken.is_empty() {
            warn!(patterns = ?broken, "extraction patterns failed to compile, their rules are disabled");
        }
        Self { config }
    }

    /// Every entity mentioned in `chunk`. Idempotent.
    ///
    /// The overlap prefix is not scanned, so an entity belongs to the chunk
    /// whose body mentions it. One entry is kept per (kind, canonical name),
    /// with the first raw mention found.
    pub fn extract(&self, chunk: &Chunk) -> BTreeSet<EntityRef> {
        let body = chunk.body();
        let heading = chunk.immediate_heading();
        let link = self.config.link_endpoint_resources;
        let mut found = Vec::new();

        if let Some(heading) = heading {
            endpoint::extract(heading, link, &mut found);
            domain::from_heading(heading, &mut found);
        }

        match chunk.content_type {
            ContentType::Text => {
                endpoint::extract(body, link, &mut found);
                domain::from_markers(body, &mut found);
            }
            ContentType::Table => {
                table::extract_table(body, heading, &mut found);
                endpoint::extract(body, link, &mut found);
                domain::from_markers(body, &mut found);
            }
            ContentType::CodeBlock => {
                table::extract_ddl(body, &mut found);
                endpoint::extract(body, link, &mut found);
            }
        }

        let mut seen: HashSet<(EntityKind, String)> = HashSet::new();
        let entities: BTreeSet<EntityRef> = found
            .into_iter()
            .filter(|e| !e.canonical_name.is_empty())
            .filter(|e| seen.insert((e.entity_kind, e.canonical_name.clone())))
            .collect();

        debug!(
            chunk_id = %chunk.chunk_id,
            content_type = ?chunk.content_type,
            entities = entities.len(),
            "entities extracted"
        );
        entities
    }

    /// Extract and append onto the chunk. Returns how many were new.
    pub fn extract_into(&self, chunk: &mut Chunk) -> usize {
        let before = chunk.entities.len();
        let entities = self.extract(chunk);
        chunk.add_entities(entities);
        chunk.entities.len() - before
    }
}
