/// Entity index and chunk store errors.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("inconsistent index: {details}")]
    InconsistentIndex { details: String },

    #[error("duplicate chunk id: {chunk_id}")]
    DuplicateChunk { chunk_id: String },

    #[error("chunk {chunk_id} belongs to document {actual}, not {expected}")]
    DocumentMismatch {
        chunk_id: String,
        expected: String,
        actual: String,
    },

    #[error("ingestion of {document_id} failed: {reason}")]
    IngestionFailed { document_id: String, reason: String },

    #[error("snapshot error: {reason}")]
    SnapshotError { reason: String },
}
