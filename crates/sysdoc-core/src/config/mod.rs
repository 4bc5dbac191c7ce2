pub mod defaults;

mod chunking_config;
mod cross_reference_config;
mod embedding_config;
mod extraction_config;
mod index_config;
mod observability_config;
mod rerank_config;
mod retrieval_config;

use std::path::Path;

pub use chunking_config::{ChunkingPolicy, SplitMode};
pub use cross_reference_config::CrossReferenceConfig;
pub use embedding_config::EmbeddingConfig;
pub use extraction_config::ExtractionConfig;
pub use index_config::IndexConfig;
pub use observability_config::ObservabilityConfig;
pub use rerank_config::RerankConfig;
pub use retrieval_config::RetrievalConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{SysdocError, SysdocResult};

/// Top-level configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SysdocConfig {
    pub chunking: ChunkingPolicy,
    pub extraction: ExtractionConfig,
    pub retrieval: RetrievalConfig,
    pub rerank: RerankConfig,
    pub cross_reference: CrossReferenceConfig,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub observability: ObservabilityConfig,
}

impl SysdocConfig {
    /// Parse a TOML string. Missing sections and fields take their defaults.
    pub fn from_toml(toml_str: &str) -> SysdocResult<Self> {
        let config: SysdocConfig =
            toml::from_str(toml_str).map_err(|e| SysdocError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk.
    pub fn load(path: &Path) -> SysdocResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> SysdocResult<()> {
        self.chunking.validate()?;
        self.retrieval.validate().map_err(SysdocError::ConfigError)?;
        if self.embedding.dimensions == 0 {
            return Err(SysdocError::ConfigError(
                "embedding.dimensions must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.cross_reference.min_relevance) {
            return Err(SysdocError::ConfigError(
                "cross_reference.min_relevance must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}
