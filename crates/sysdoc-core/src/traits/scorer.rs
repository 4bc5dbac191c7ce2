use crate::errors::SysdocResult;

/// Cross-encoder relevance scorer.
pub trait ICrossEncoderScorer: Send + Sync {
    /// Score each document against the query. Returns one relevance in
    /// `[0, 1]` per document, in input order.
    fn score_batch(&self, query: &str, documents: &[String]) -> SysdocResult<Vec<f64>>;

    /// Score a single pair.
    fn score(&self, query: &str, document: &str) -> SysdocResult<f64> {
        let scores = self.score_batch(query, &[document.to_string()])?;
        Ok(scores.first().copied().unwrap_or(0.0))
    }

    fn name(&self) -> &str;
}
