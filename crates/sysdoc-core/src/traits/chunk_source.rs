use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{Chunk, QueryFilters};

/// Read-only view of the indexed corpus used at query time.
pub trait IChunkSource: Send + Sync {
    /// Every indexed chunk that passes the filters.
    fn pool(&self, filters: &QueryFilters) -> Vec<Arc<Chunk>>;

    /// Look up one chunk.
    fn chunk(&self, chunk_id: &str) -> Option<Arc<Chunk>>;

    /// Chunk ids mentioning an entity. Unknown names yield an empty set.
    fn chunks_for_entity(&self, canonical_name: &str) -> HashSet<String>;
}
