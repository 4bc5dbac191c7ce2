use serde::{Deserialize, Serialize};

use super::defaults;

/// Cross-reference enrichment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossReferenceConfig {
    pub max_extra_per_result: usize,
    /// Minimum Jaccard overlap of entity sets.
    pub min_relevance: f64,
}

impl Default for CrossReferenceConfig {
    fn default() -> Self {
        Self {
            max_extra_per_result: defaults::DEFAULT_MAX_EXTRA_PER_RESULT,
            min_relevance: defaults::DEFAULT_MIN_RELEVANCE,
        }
    }
}
