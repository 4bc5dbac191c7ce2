//! Span definitions per operation: ingestion, query, rerank.

/// Create an ingestion span.
#[macro_export]
macro_rules! ingestion_span {
    ($document_id:expr) => {
        tracing::info_span!("sysdoc.ingestion", document_id = %$document_id)
    };
}

/// Create a query span.
#[macro_export]
macro_rules! query_span {
    ($query:expr, $top_k:expr) => {
        tracing::info_span!("sysdoc.query", query = %$query, top_k = $top_k)
    };
}

/// Create a rerank span.
#[macro_export]
macro_rules! rerank_span {
    ($scorer:expr, $candidates:expr) => {
        tracing::info_span!("sysdoc.rerank", scorer = %$scorer, candidates = $candidates)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const INGESTION: &str = "sysdoc.ingestion";
    pub const QUERY: &str = "sysdoc.query";
    pub const RERANK: &str = "sysdoc.rerank";
}
