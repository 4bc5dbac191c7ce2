use serde::{Deserialize, Serialize};

/// A query-scoped candidate. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalCandidate {
    pub chunk_id: String,
    pub document_id: String,
    /// Raw cosine similarity from the dense channel.
    pub dense_score: Option<f64>,
    /// Raw BM25 score from the sparse channel.
    pub sparse_score: Option<f64>,
    /// Weighted sum of the min-max normalized channel scores.
    pub merged_score: f64,
    pub rerank_score: Option<f64>,
    /// Set only on candidates added by cross-reference enrichment.
    pub cross_ref_of: Option<String>,
}

impl RetrievalCandidate {
    pub fn new(chunk_id: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            document_id: document_id.into(),
            dense_score: None,
            sparse_score: None,
            merged_score: 0.0,
            rerank_score: None,
            cross_ref_of: None,
        }
    }

    /// The score that decides final order: rerank score once reranked.
    pub fn ranking_score(&self) -> f64 {
        self.rerank_score.unwrap_or(self.merged_score)
    }

    pub fn is_cross_reference(&self) -> bool {
        self.cross_ref_of.is_some()
    }
}
