use serde::{Deserialize, Serialize};

use super::defaults;

/// Hybrid retrieval configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Each channel returns up to `top_k * fan_out` candidates.
    pub fan_out: usize,
    pub dense_weight: f64,
    pub sparse_weight: f64,
    /// BM25 term-frequency saturation.
    pub bm25_k1: f64,
    /// BM25 length normalization.
    pub bm25_b: f64,
    pub default_top_k: usize,
    pub max_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            fan_out: defaults::DEFAULT_FAN_OUT,
            dense_weight: defaults::DEFAULT_DENSE_WEIGHT,
            sparse_weight: defaults::DEFAULT_SPARSE_WEIGHT,
            bm25_k1: defaults::DEFAULT_BM25_K1,
            bm25_b: defaults::DEFAULT_BM25_B,
            default_top_k: defaults::DEFAULT_TOP_K,
            max_top_k: defaults::DEFAULT_MAX_TOP_K,
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<(), String> {
        let weights = [self.dense_weight, self.sparse_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("retrieval weights must be finite and non-negative".to_string());
        }
        if self.dense_weight + self.sparse_weight <= 0.0 {
            return Err("retrieval weights must have a positive sum".to_string());
        }
        if self.fan_out == 0 {
            return Err("fan_out must be at least 1".to_string());
        }
        Ok(())
    }
}
