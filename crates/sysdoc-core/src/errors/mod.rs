mod chunking_error;
mod embedding_error;
mod index_error;
mod parse_error;
mod retrieval_error;

pub use chunking_error::ChunkingError;
pub use embedding_error::EmbeddingError;
pub use index_error::IndexError;
pub use parse_error::ParseError;
pub use retrieval_error::RetrievalError;

/// Top-level error for the whole workspace. Subsystem errors convert into it.
#[derive(Debug, thiserror::Error)]
pub enum SysdocError {
    #[error("chunking error: {0}")]
    ChunkingError(#[from] ChunkingError),

    #[error("parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("index error: {0}")]
    IndexError(#[from] IndexError),

    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("document not found: {document_id}")]
    DocumentNotFound { document_id: String },

    #[error("chunk not found: {chunk_id}")]
    ChunkNotFound { chunk_id: String },

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),

    #[error("degraded mode: {component} using {fallback}")]
    DegradedMode { component: String, fallback: String },
}

impl SysdocError {
    /// Structural or configuration errors. These are raised to the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SysdocError::ChunkingError(ChunkingError::InvalidPolicy { .. })
                | SysdocError::ConfigError(_)
                | SysdocError::ParseError(_)
        )
    }

    /// Failures of external scoring dependencies. These degrade the response
    /// instead of failing it.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SysdocError::RetrievalError(RetrievalError::ScorerUnavailable { .. })
                | SysdocError::RetrievalError(RetrievalError::Timeout { .. })
                | SysdocError::EmbeddingError(EmbeddingError::ProviderUnavailable { .. })
                | SysdocError::EmbeddingError(EmbeddingError::InferenceFailed { .. })
                | SysdocError::DegradedMode { .. }
        )
    }

    /// Data-integrity violations that must trigger a repair pass.
    pub fn needs_repair(&self) -> bool {
        matches!(
            self,
            SysdocError::IndexError(IndexError::InconsistentIndex { .. })
        )
    }
}

/// Convenience alias used across all sysdoc crates.
pub type SysdocResult<T> = Result<T, SysdocError>;
