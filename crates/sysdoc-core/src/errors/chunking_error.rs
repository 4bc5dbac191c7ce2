/// Chunking errors. All of them are configuration problems the caller must fix.
#[derive(Debug, thiserror::Error)]
pub enum ChunkingError {
    #[error("invalid chunking policy: {reason}")]
    InvalidPolicy { reason: String },
}
