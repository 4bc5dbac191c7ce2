/// Retrieval subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("no retrievable content after filtering")]
    EmptyIndex,

    #[error("scorer unavailable: {reason}")]
    ScorerUnavailable { reason: String },

    #[error("scorer timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },
}
