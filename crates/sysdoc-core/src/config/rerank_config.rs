use serde::{Deserialize, Serialize};

use super::defaults;

/// Cross-encoder reranking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Only the top N merged candidates are sent to the scorer.
    pub top_n: usize,
    /// Pairs per scorer call.
    pub batch_size: usize,
    /// Budget for all scorer calls of one query.
    pub timeout_ms: u64,
    /// Consecutive failures before the breaker opens.
    pub failure_threshold: u32,
    /// How long an open breaker short-circuits before probing again.
    pub cooldown_secs: u64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            top_n: defaults::DEFAULT_RERANK_TOP_N,
            batch_size: defaults::DEFAULT_RERANK_BATCH_SIZE,
            timeout_ms: defaults::DEFAULT_RERANK_TIMEOUT_MS,
            failure_threshold: defaults::DEFAULT_FAILURE_THRESHOLD,
            cooldown_secs: defaults::DEFAULT_COOLDOWN_SECS,
        }
    }
}
