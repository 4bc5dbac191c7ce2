use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chunk::{Chunk, DocType};

/// Pre-filters applied to the candidate pool before any scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryFilters {
    /// Accept any of these document types. Empty means all.
    pub doc_types: Vec<DocType>,
    /// Accept chunks carrying any of these tags. Empty means all.
    pub tags: Vec<String>,
    /// Inclusive lower bound on `created_at`.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub date_to: Option<DateTime<Utc>>,
}

impl QueryFilters {
    pub fn is_empty(&self) -> bool {
        self.doc_types.is_empty()
            && self.tags.is_empty()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    pub fn matches(&self, chunk: &Chunk) -> bool {
        if !self.doc_types.is_empty() && !self.doc_types.contains(&chunk.metadata.doc_type) {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| chunk.metadata.tags.contains(t)) {
            return false;
        }
        if self.date_from.is_some_and(|from| chunk.created_at < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| chunk.created_at > to) {
            return false;
        }
        true
    }
}
