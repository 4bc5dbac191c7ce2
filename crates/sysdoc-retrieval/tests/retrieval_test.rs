mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{corpus, DownScorer, KeywordScorer, ScriptedScorer, SlowEmbedder, SlowScorer};
use sysdoc_core::config::{EmbeddingConfig, RerankConfig, SysdocConfig};
use sysdoc_core::errors::RetrievalError;
use sysdoc_core::models::{DocType, QueryFilters, ResultRole};
use sysdoc_core::traits::IChunkSource;
use sysdoc_core::SysdocError;
use sysdoc_embeddings::EmbeddingEngine;
use sysdoc_retrieval::{
    BreakerState, CircuitBreaker, HybridRetriever, QueryEngine, QueryRequest, Reranker,
};
use test_fixtures::load_query_scenarios;

fn engine() -> QueryEngine {
    let (store, embeddings) = corpus();
    QueryEngine::new(store, embeddings, &SysdocConfig::default())
}

#[tokio::test]
async fn endpoint_query_is_enriched_with_schema_chunk() {
    let outcome = engine()
        .query(&QueryRequest::new("user registration fields").with_top_k(1))
        .await
        .unwrap();
    let result = outcome.result;

    assert!(!result.degraded);
    assert_eq!(result.items.len(), 2);

    let primary = &result.items[0];
    assert!(primary.is_primary());
    assert_eq!(primary.document_id(), "user-api");
    assert_eq!(primary.section_path, vec!["POST /api/users".to_string()]);

    let extra = &result.items[1];
    assert_eq!(extra.document_id(), "user-schema");
    assert_eq!(extra.candidate.cross_ref_of.as_deref(), Some(primary.chunk_id()));
    match &extra.role {
        ResultRole::CrossReference {
            origin,
            relevance,
            shared_entities,
        } => {
            assert_eq!(origin, primary.chunk_id());
            assert!((relevance - 0.25).abs() < 1e-9);
            assert_eq!(shared_entities, &vec!["users".to_string()]);
        }
        ResultRole::Primary => panic!("extra marked as primary"),
    }

    let cited: Vec<(&str, &str)> = result
        .citations
        .iter()
        .map(|c| (c.document_id.as_str(), c.filename.as_str()))
        .collect();
    assert_eq!(
        cited,
        vec![("user-api", "user-api.md"), ("user-schema", "user-schema.docx")]
    );
    assert_eq!(result.citations[1].section_path, vec!["users".to_string()]);
}

#[tokio::test]
async fn fixture_scenarios_hold() {
    let engine = engine();
    for scenario in load_query_scenarios() {
        let outcome = engine
            .query(&QueryRequest::new(&scenario.query).with_top_k(scenario.top_k))
            .await
            .unwrap();
        let result = outcome.result;
        assert_eq!(
            result.items[0].document_id(),
            scenario.expected_primary,
            "{}",
            scenario.name
        );
        let extras: Vec<&str> = result.cross_references().map(|i| i.document_id()).collect();
        assert_eq!(extras, scenario.expected_cross_references, "{}", scenario.name);
    }
}

#[tokio::test]
async fn cross_reference_can_be_switched_off() {
    let outcome = engine()
        .query(
            &QueryRequest::new("user registration fields")
                .with_top_k(1)
                .with_cross_reference(false),
        )
        .await
        .unwrap();
    assert_eq!(outcome.result.items.len(), 1);
    assert_eq!(outcome.result.citations.len(), 1);
}

#[test]
fn filtered_pool_smaller_than_top_k_returns_exactly_pool() {
    let (store, embeddings) = corpus();
    let retriever = HybridRetriever::new(Default::default());
    let query_vector = embeddings.embed_query("anything at all").unwrap().value;
    let filters = QueryFilters {
        doc_types: vec![DocType::TableSchema],
        ..Default::default()
    };
    let pool = store.pool(&filters).len();
    assert_eq!(pool, 1);

    let hits = retriever
        .retrieve(store.as_ref(), "anything at all", Some(&query_vector), &filters, 5)
        .unwrap();
    assert_eq!(hits.len(), pool);
    assert!(hits.iter().all(|h| h.document_id == "user-schema"));
}

#[test]
fn merged_scores_are_weighted_and_bounded() {
    let (store, embeddings) = corpus();
    let retriever = HybridRetriever::new(Default::default());
    let qv = embeddings.embed_query("user").unwrap().value;
    let hits = retriever
        .retrieve(store.as_ref(), "user", Some(&qv), &QueryFilters::default(), 10)
        .unwrap();
    assert!(!hits.is_empty());
    for pair in hits.windows(2) {
        assert!(pair[0].merged_score >= pair[1].merged_score);
    }
    for h in &hits {
        assert!((0.0..=1.0 + 1e-9).contains(&h.merged_score));
    }
    // Best hit has the top dense and the top sparse score.
    assert!((hits[0].merged_score - 1.0).abs() < 1e-9);
    assert_eq!(hits[0].document_id, "user-api");
}

#[test]
fn sparse_only_without_query_vector() {
    let (store, _) = corpus();
    let retriever = HybridRetriever::new(Default::default());
    let hits = retriever
        .retrieve(store.as_ref(), "payment status", None, &QueryFilters::default(), 5)
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].dense_score.is_none());
    assert!(hits[0].sparse_score.unwrap() > 0.0);

    let none = retriever
        .retrieve(store.as_ref(), "zebra", None, &QueryFilters::default(), 5)
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn empty_filtered_pool_is_empty_index() {
    let (store, _) = corpus();
    let retriever = HybridRetriever::new(Default::default());
    let filters = QueryFilters {
        tags: vec!["no-such-tag".to_string()],
        ..Default::default()
    };
    let err = retriever
        .retrieve(store.as_ref(), "user", None, &filters, 5)
        .unwrap_err();
    assert!(matches!(
        err,
        SysdocError::RetrievalError(RetrievalError::EmptyIndex)
    ));
}

#[tokio::test]
async fn scorer_reorders_reranked_block() {
    let scorer = Arc::new(KeywordScorer::new("CREATE TABLE"));
    let engine = engine().with_scorer(scorer.clone());
    let outcome = engine
        .query(&QueryRequest::new("user").with_top_k(4).with_cross_reference(false))
        .await
        .unwrap();
    let result = outcome.result;

    assert!(!result.degraded);
    assert_eq!(result.items.len(), 4);
    assert!(result.items[0].content.contains("CREATE TABLE"));
    assert_eq!(result.items[0].candidate.rerank_score, Some(1.0));
    for pair in result.items.windows(2) {
        assert!(pair[0].candidate.rerank_score >= pair[1].candidate.rerank_score);
    }
    // Four texts, default batch of eight: one call.
    assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unavailable_scorer_degrades_to_merged_order() {
    let engine = engine().with_scorer(Arc::new(DownScorer::new()));
    let outcome = engine
        .query(&QueryRequest::new("user").with_top_k(4).with_cross_reference(false))
        .await
        .unwrap();
    let result = outcome.result;

    assert!(result.degraded);
    assert!(result.items.iter().all(|i| i.candidate.rerank_score.is_none()));
    for pair in result.items.windows(2) {
        assert!(pair[0].candidate.merged_score >= pair[1].candidate.merged_score);
    }
    assert!(outcome
        .degradations
        .iter()
        .any(|e| e.component == "rerank" && e.fallback_used == "merged_score"));
}

#[tokio::test]
async fn breaker_short_circuits_after_repeated_failures() {
    let scorer = Arc::new(DownScorer::new());
    let config = RerankConfig {
        failure_threshold: 2,
        ..Default::default()
    };
    let reranker = Reranker::with_scorer(config, scorer.clone())
        .with_breaker(CircuitBreaker::new(2, Duration::from_secs(60)));
    let engine = engine().with_reranker(reranker);

    for _ in 0..4 {
        let outcome = engine
            .query(&QueryRequest::new("user").with_top_k(2))
            .await
            .unwrap();
        assert!(outcome.result.degraded);
    }
    assert_eq!(scorer.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn cancelled_half_open_trial_lets_the_next_query_retry() {
    let scorer = Arc::new(ScriptedScorer::new(Duration::from_millis(300)));
    let config = RerankConfig {
        timeout_ms: 5_000,
        ..Default::default()
    };
    let reranker = Reranker::with_scorer(config, scorer.clone())
        .with_breaker(CircuitBreaker::new(1, Duration::ZERO));
    let engine = engine().with_reranker(reranker);
    let request = QueryRequest::new("user").with_top_k(2);

    let first = engine.query(&request).await.unwrap();
    assert!(first.result.degraded);
    assert_eq!(engine.reranker().breaker().state(), BreakerState::Open);

    scorer.set(ScriptedScorer::SLOW);
    let cancelled = tokio::time::timeout(Duration::from_millis(20), engine.query(&request)).await;
    assert!(cancelled.is_err());
    assert_eq!(engine.reranker().breaker().state(), BreakerState::Open);

    scorer.set(ScriptedScorer::HEALTHY);
    let recovered = engine.query(&request).await.unwrap();
    assert!(!recovered.result.degraded);
    assert_eq!(engine.reranker().breaker().state(), BreakerState::Closed);
}

#[tokio::test]
async fn slow_embedder_does_not_stall_the_runtime() {
    let (store, _) = corpus();
    let embeddings = Arc::new(EmbeddingEngine::with_provider(
        EmbeddingConfig {
            dimensions: 384,
            ..Default::default()
        },
        Arc::new(SlowEmbedder(Duration::from_millis(300))),
    ));
    let engine = QueryEngine::new(store, embeddings, &SysdocConfig::default());

    let request = QueryRequest::new("user").with_top_k(2);
    let started = Instant::now();
    let (outcome, ticked) = tokio::join!(
        engine.query(&request),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            started.elapsed()
        }
    );
    assert!(!outcome.unwrap().result.degraded);
    assert!(ticked < Duration::from_millis(150), "runtime stalled for {ticked:?}");
}

#[tokio::test]
async fn slow_scorer_hits_the_query_timeout() {
    let config = RerankConfig {
        timeout_ms: 20,
        ..Default::default()
    };
    let reranker = Reranker::with_scorer(config, Arc::new(SlowScorer(Duration::from_millis(300))));
    let engine = engine().with_reranker(reranker);

    let outcome = engine
        .query(&QueryRequest::new("user").with_top_k(2))
        .await
        .unwrap();
    assert!(outcome.result.degraded);
    let event = outcome
        .degradations
        .iter()
        .find(|e| e.component == "rerank")
        .unwrap();
    assert!(event.failure.contains("timed out"));
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let err = engine().query(&QueryRequest::new("   ")).await.unwrap_err();
    assert!(matches!(
        err,
        SysdocError::RetrievalError(RetrievalError::InvalidQuery { .. })
    ));
}

#[test]
fn top_k_is_capped_at_configured_max() {
    let engine = engine();
    assert_eq!(engine.resolve_top_k(None).unwrap(), 5);
    assert_eq!(engine.resolve_top_k(Some(500)).unwrap(), 20);
    assert!(engine.resolve_top_k(Some(0)).is_err());
}
