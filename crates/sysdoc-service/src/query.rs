//! Query entrypoint and the ask flow on top of it.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use sysdoc_core::errors::{RetrievalError, SysdocError, SysdocResult};
use sysdoc_core::models::{
    AssembledResult, DegradationEvent, GenerationRequest, QueryFilters, ResponseMode,
};
use sysdoc_core::traits::IGenerator;
use sysdoc_observability::tracing_setup::events;
use sysdoc_observability::{query_span, DegradationTracker};
use sysdoc_retrieval::{QueryEngine, QueryRequest};
use tracing::{debug, Instrument};

use crate::answer::{build_context, confidence, Answer};

/// Components whose health is inferred from each query.
const EMBEDDINGS: &str = "embeddings";
const RERANK: &str = "rerank";

/// Serves queries, records the fallbacks they take and hands results to
/// the generator.
///
/// Only fatal errors and invalid queries reach the caller. An empty corpus
/// (or a filter that excludes everything) yields an empty result.
pub struct QueryService {
    engine: QueryEngine,
    generator: Option<Arc<dyn IGenerator>>,
    tracker: Mutex<DegradationTracker>,
}

impl QueryService {
    pub fn new(engine: QueryEngine) -> Self {
        Self {
            engine,
            generator: None,
            tracker: Mutex::new(DegradationTracker::new()),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn IGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    /// Ordered chunks plus citations for `request`.
    pub async fn query(&self, request: &QueryRequest) -> SysdocResult<AssembledResult> {
        let started = Instant::now();
        let span = query_span!(request.query_text, request.top_k.unwrap_or_default());
        let outcome = match self.engine.query(request).instrument(span).await {
            Ok(outcome) => outcome,
            Err(SysdocError::RetrievalError(RetrievalError::EmptyIndex)) => {
                debug!("nothing retrievable, returning an empty result");
                events::query_completed(0, 0, false, started.elapsed().as_millis());
                return Ok(AssembledResult::default());
            }
            Err(e) => return Err(e),
        };

        let reranked = self.engine.reranker().has_scorer() && !outcome.result.is_empty();
        self.track(&outcome.degradations, reranked)?;

        let result = outcome.result;
        events::query_completed(
            result.items.len(),
            result.citations.len(),
            result.degraded,
            started.elapsed().as_millis(),
        );
        Ok(result)
    }

    /// Answer `question` from the indexed documents.
    pub async fn ask(
        &self,
        question: &str,
        mode: ResponseMode,
        filters: QueryFilters,
    ) -> SysdocResult<Answer> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| SysdocError::ConfigError("no generator configured".to_string()))?;

        let request = QueryRequest::new(question).with_filters(filters);
        let result = self.query(&request).await?;
        if result.is_empty() {
            return Ok(Answer::empty());
        }

        let generation = GenerationRequest {
            question: question.to_string(),
            context: build_context(&result),
            mode,
        };
        let generator = Arc::clone(generator);
        let answer = tokio::task::spawn_blocking(move || generator.generate(&generation))
            .await
            .map_err(|e| SysdocError::ConcurrencyError(format!("generation task failed: {e}")))??;

        Ok(Answer {
            answer,
            confidence: confidence(&result),
            citations: result.citations,
            degraded: result.degraded,
        })
    }

    /// Degradations still in effect.
    pub fn active_degradations(&self) -> SysdocResult<Vec<DegradationEvent>> {
        Ok(self
            .tracker()?
            .active_degradations()
            .into_iter()
            .map(|t| t.event.clone())
            .collect())
    }

    pub fn is_degraded(&self, component: &str) -> SysdocResult<bool> {
        Ok(self.tracker()?.is_degraded(component))
    }

    fn track(&self, degradations: &[DegradationEvent], reranked: bool) -> SysdocResult<()> {
        let mut tracker = self.tracker()?;
        tracker.record_all(degradations.iter().cloned());

        let mut healthy = vec![EMBEDDINGS];
        if reranked {
            healthy.push(RERANK);
        }
        for component in healthy {
            let failed_now = degradations.iter().any(|e| e.component == component);
            if !failed_now {
                tracker.mark_recovered(component);
            }
        }
        Ok(())
    }

    fn tracker(&self) -> SysdocResult<MutexGuard<'_, DegradationTracker>> {
        self.tracker
            .lock()
            .map_err(|e| SysdocError::ConcurrencyError(format!("degradation tracker poisoned: {e}")))
    }
}
