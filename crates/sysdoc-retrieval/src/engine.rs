//! QueryEngine: runs the full query pipeline.
//!
//! embed query → hybrid retrieve → rerank → cross-reference → assemble

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sysdoc_core::config::SysdocConfig;
use sysdoc_core::errors::{RetrievalError, SysdocError, SysdocResult};
use sysdoc_core::models::{AssembledResult, DegradationEvent, QueryFilters};
use sysdoc_core::traits::{IChunkSource, ICrossEncoderScorer};
use sysdoc_embeddings::EmbeddingEngine;
use tracing::{info, warn};

use crate::assembler::ResultAssembler;
use crate::cross_reference::CrossReferenceEnricher;
use crate::rerank::Reranker;
use crate::search::HybridRetriever;

/// Query entrypoint input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query_text: String,
    #[serde(default)]
    pub filters: QueryFilters,
    /// Falls back to the configured default; capped at the configured max.
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default = "include_cross_reference_default")]
    pub include_cross_reference: bool,
}

fn include_cross_reference_default() -> bool {
    true
}

impl QueryRequest {
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            filters: QueryFilters::default(),
            top_k: None,
            include_cross_reference: true,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_filters(mut self, filters: QueryFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_cross_reference(mut self, include: bool) -> Self {
        self.include_cross_reference = include;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub result: AssembledResult,
    /// Fallbacks taken while serving this query.
    pub degradations: Vec<DegradationEvent>,
}

pub struct QueryEngine {
    source: Arc<dyn IChunkSource>,
    embeddings: Arc<EmbeddingEngine>,
    retriever: HybridRetriever,
    reranker: Reranker,
    enricher: CrossReferenceEnricher,
    assembler: ResultAssembler,
}

impl QueryEngine {
    pub fn new(
        source: Arc<dyn IChunkSource>,
        embeddings: Arc<EmbeddingEngine>,
        config: &SysdocConfig,
    ) -> Self {
        Self {
            source,
            embeddings,
            retriever: HybridRetriever::new(config.retrieval.clone()),
            reranker: Reranker::new(config.rerank.clone()),
            enricher: CrossReferenceEnricher::new(config.cross_reference.clone()),
            assembler: ResultAssembler,
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn ICrossEncoderScorer>) -> Self {
        let config = self.reranker.config().clone();
        self.reranker = Reranker::with_scorer(config, scorer);
        self
    }

    pub fn with_reranker(mut self, reranker: Reranker) -> Self {
        self.reranker = reranker;
        self
    }

    pub fn source(&self) -> &Arc<dyn IChunkSource> {
        &self.source
    }

    pub fn reranker(&self) -> &Reranker {
        &self.reranker
    }

    /// Effective `top_k` of a request.
    pub fn resolve_top_k(&self, requested: Option<usize>) -> SysdocResult<usize> {
        let config = self.retriever.config();
        let top_k = requested.unwrap_or(config.default_top_k);
        if top_k == 0 {
            return Err(RetrievalError::InvalidQuery {
                reason: "top_k must be at least 1".to_string(),
            }
            .into());
        }
        Ok(top_k.min(config.max_top_k.max(1)))
    }

    /// Run the pipeline. `EmptyIndex` is returned as an error; callers
    /// decide how to present it.
    pub async fn query(&self, request: &QueryRequest) -> SysdocResult<QueryOutcome> {
        let query_text = request.query_text.trim();
        if query_text.is_empty() {
            return Err(RetrievalError::InvalidQuery {
                reason: "query text is empty".to_string(),
            }
            .into());
        }
        let top_k = self.resolve_top_k(request.top_k)?;

        let mut degraded = false;
        let mut degradations = Vec::new();

        let embeddings = Arc::clone(&self.embeddings);
        let text = query_text.to_string();
        let embedded = blocking("query embedding", move || embeddings.embed_query(&text)).await?;
        let query_vector = match embedded {
            Ok(embedded) => {
                degraded |= embedded.degraded;
                degradations.extend(embedded.event);
                Some(embedded.value)
            }
            Err(e) => {
                warn!(error = %e, "query embedding failed, sparse channel only");
                degraded = true;
                degradations.push(DegradationEvent::now(
                    "embeddings",
                    e.to_string(),
                    "sparse_only",
                ));
                None
            }
        };

        let retriever = self.retriever.clone();
        let source = Arc::clone(&self.source);
        let text = query_text.to_string();
        let filters = request.filters.clone();
        let candidates = blocking("retrieval", move || {
            retriever.retrieve(source.as_ref(), &text, query_vector.as_deref(), &filters, top_k)
        })
        .await??;

        let reranked = self
            .reranker
            .rerank(query_text, candidates, self.source.as_ref())
            .await;
        degraded |= reranked.degraded;
        degradations.extend(reranked.event);
        let mut primaries = reranked.candidates;
        primaries.truncate(top_k);

        let (primaries, extras) = if request.include_cross_reference {
            let enricher = self.enricher.clone();
            let source = Arc::clone(&self.source);
            blocking("cross-reference", move || {
                let extras = enricher.enrich(&primaries, source.as_ref());
                (primaries, extras)
            })
            .await?
        } else {
            (primaries, Vec::new())
        };

        let result = self
            .assembler
            .assemble(primaries, extras, self.source.as_ref(), degraded);

        info!(
            primaries = result.primaries().count(),
            cross_references = result.cross_references().count(),
            citations = result.citations.len(),
            degraded,
            "query complete"
        );

        Ok(QueryOutcome {
            result,
            degradations,
        })
    }
}

/// Run synchronous work (external embedder, rayon fan-out) on the blocking
/// pool so it never stalls the async workers.
async fn blocking<T, F>(what: &str, work: F) -> SysdocResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| SysdocError::ConcurrencyError(format!("{what} task failed: {e}")))
}
