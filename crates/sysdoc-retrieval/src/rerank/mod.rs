//! Cross-encoder reranking of the top merged candidates.
//!
//! Scorer calls run on the blocking pool in batches, all under one per-query
//! timeout. Any failure (error, timeout, wrong score count, open breaker)
//! degrades to merged-score order instead of failing the query.

mod breaker;

use std::sync::Arc;
use std::time::Duration;

use sysdoc_core::config::RerankConfig;
use sysdoc_core::errors::{RetrievalError, SysdocResult};
use sysdoc_core::models::{DegradationEvent, RetrievalCandidate};
use sysdoc_core::traits::{IChunkSource, ICrossEncoderScorer};
use sysdoc_observability::rerank_span;
use tracing::{debug, warn, Instrument};

pub use breaker::{BreakerState, CircuitBreaker, Permit};

/// Fallback recorded in degradation events.
const FALLBACK: &str = "merged_score";

#[derive(Debug, Clone, PartialEq)]
pub struct RerankOutcome {
    pub candidates: Vec<RetrievalCandidate>,
    /// True when the scorer could not be used and merged order was kept.
    pub degraded: bool,
    pub event: Option<DegradationEvent>,
}

pub struct Reranker {
    scorer: Option<Arc<dyn ICrossEncoderScorer>>,
    config: RerankConfig,
    breaker: CircuitBreaker,
}

impl Reranker {
    /// A reranker without a scorer passes candidates through unchanged.
    pub fn new(config: RerankConfig) -> Self {
        let breaker = CircuitBreaker::new(
            config.failure_threshold,
            Duration::from_secs(config.cooldown_secs),
        );
        Self {
            scorer: None,
            config,
            breaker,
        }
    }

    pub fn with_scorer(config: RerankConfig, scorer: Arc<dyn ICrossEncoderScorer>) -> Self {
        Self {
            scorer: Some(scorer),
            ..Self::new(config)
        }
    }

    /// Replace the breaker, e.g. with a shorter cooldown.
    pub fn with_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn config(&self) -> &RerankConfig {
        &self.config
    }

    pub fn has_scorer(&self) -> bool {
        self.scorer.is_some()
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Rerank the first `top_n` candidates by cross-encoder score.
    /// Candidates past `top_n` follow in their incoming order.
    pub async fn rerank(
        &self,
        query: &str,
        mut candidates: Vec<RetrievalCandidate>,
        source: &dyn IChunkSource,
    ) -> RerankOutcome {
        let Some(scorer) = self.scorer.as_ref() else {
            return RerankOutcome::passthrough(candidates);
        };
        if candidates.is_empty() || self.config.top_n == 0 {
            return RerankOutcome::passthrough(candidates);
        }
        let Some(permit) = self.breaker.allow() else {
            debug!("circuit open, skipping scorer");
            return RerankOutcome::degraded(candidates, "circuit breaker open".to_string());
        };

        let head_len = self.config.top_n.min(candidates.len());
        let texts: Vec<String> = candidates[..head_len]
            .iter()
            .map(|c| {
                source
                    .chunk(&c.chunk_id)
                    .map(|chunk| chunk.content.clone())
                    .unwrap_or_default()
            })
            .collect();

        let budget = Duration::from_millis(self.config.timeout_ms);
        let scoring = score_all(
            Arc::clone(scorer),
            Arc::from(query),
            texts,
            self.config.batch_size,
        )
        .instrument(rerank_span!(scorer.name(), head_len));

        let scores = match tokio::time::timeout(budget, scoring).await {
            Ok(Ok(scores)) => scores,
            Ok(Err(e)) => return self.fail(permit, candidates, e.to_string()),
            Err(_) => {
                let e = RetrievalError::Timeout {
                    elapsed_ms: self.config.timeout_ms,
                };
                return self.fail(permit, candidates, e.to_string());
            }
        };
        permit.succeed();

        for (candidate, score) in candidates.iter_mut().zip(scores) {
            candidate.rerank_score = Some(score);
        }
        candidates[..head_len].sort_by(|a, b| {
            let (sa, sb) = (a.rerank_score.unwrap_or(0.0), b.rerank_score.unwrap_or(0.0));
            sb.total_cmp(&sa).then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        debug!(reranked = head_len, "rerank complete");

        RerankOutcome {
            candidates,
            degraded: false,
            event: None,
        }
    }

    fn fail(
        &self,
        permit: Permit<'_>,
        candidates: Vec<RetrievalCandidate>,
        reason: String,
    ) -> RerankOutcome {
        permit.fail();
        warn!(reason = %reason, breaker = ?self.breaker.state(), "rerank failed, keeping merged order");
        RerankOutcome::degraded(candidates, reason)
    }
}

impl RerankOutcome {
    fn passthrough(candidates: Vec<RetrievalCandidate>) -> Self {
        Self {
            candidates,
            degraded: false,
            event: None,
        }
    }

    /// Candidates arrive in merged order (with its diversity tie-break) and
    /// keep it.
    fn degraded(mut candidates: Vec<RetrievalCandidate>, reason: String) -> Self {
        for c in candidates.iter_mut() {
            c.rerank_score = None;
        }
        Self {
            candidates,
            degraded: true,
            event: Some(DegradationEvent::now("rerank", reason, FALLBACK)),
        }
    }
}

/// Score all texts, one blocking task per batch, results in input order.
async fn score_all(
    scorer: Arc<dyn ICrossEncoderScorer>,
    query: Arc<str>,
    texts: Vec<String>,
    batch_size: usize,
) -> SysdocResult<Vec<f64>> {
    let handles: Vec<_> = texts
        .chunks(batch_size.max(1))
        .map(|batch| {
            let scorer = Arc::clone(&scorer);
            let query = Arc::clone(&query);
            let batch = batch.to_vec();
            tokio::task::spawn_blocking(move || score_batch(scorer.as_ref(), &query, &batch))
        })
        .collect();

    let mut scores = Vec::with_capacity(texts.len());
    for handle in handles {
        let batch = handle.await.map_err(|e| RetrievalError::ScorerUnavailable {
            reason: format!("scorer task failed: {e}"),
        })??;
        scores.extend(batch);
    }
    Ok(scores)
}

fn score_batch(
    scorer: &dyn ICrossEncoderScorer,
    query: &str,
    batch: &[String],
) -> SysdocResult<Vec<f64>> {
    let scores = scorer.score_batch(query, batch)?;
    if scores.len() != batch.len() {
        return Err(RetrievalError::ScorerUnavailable {
            reason: format!("{} scores for {} documents", scores.len(), batch.len()),
        }
        .into());
    }
    if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
        return Err(RetrievalError::ScorerUnavailable {
            reason: format!("non-finite score {bad}"),
        }
        .into());
    }
    Ok(scores.into_iter().map(|s| s.clamp(0.0, 1.0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(chunk: &str, doc: &str, merged: f64) -> RetrievalCandidate {
        RetrievalCandidate {
            merged_score: merged,
            rerank_score: Some(0.9),
            ..RetrievalCandidate::new(chunk, doc)
        }
    }

    #[test]
    fn degraded_outcome_keeps_incoming_order() {
        // Equal merged scores, already ordered by the diversity tie-break.
        let incoming = vec![cand("chk_b", "orders", 0.5), cand("chk_a", "users", 0.5)];
        let outcome = RerankOutcome::degraded(incoming, "connection refused".to_string());

        let ids: Vec<&str> = outcome.candidates.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["chk_b", "chk_a"]);
        assert!(outcome.candidates.iter().all(|c| c.rerank_score.is_none()));
        assert_eq!(outcome.event.unwrap().fallback_used, FALLBACK);
    }
}
