/// Errors reported by the external parser collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unsupported format: {format}")]
    UnsupportedFormat { format: String },

    #[error("corrupt document {document_id}: {reason}")]
    CorruptDocument { document_id: String, reason: String },
}
