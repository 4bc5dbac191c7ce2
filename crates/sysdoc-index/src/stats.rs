use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Corpus-level counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: usize,
    pub chunks: usize,
    /// Distinct canonical names.
    pub entities: usize,
    /// Registered documents per doc type, keyed by `DocType::as_str`.
    pub documents_by_type: BTreeMap<String, usize>,
    /// Registered documents per status.
    pub documents_by_status: BTreeMap<String, usize>,
    pub pending_tasks: usize,
}
