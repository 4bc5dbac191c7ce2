use sysdoc_core::config::ObservabilityConfig;
use sysdoc_core::models::DegradationEvent;
use sysdoc_observability::tracing_setup::spans::names;
use sysdoc_observability::{init_tracing, DegradationTracker, RecoveryStatus};

#[test]
fn init_is_idempotent() {
    let config = ObservabilityConfig::default();
    let first = init_tracing(&config);
    let second = init_tracing(&config);
    // A second install never replaces the first.
    assert!(!second || !first);
}

#[test]
fn span_macros_use_stable_names() {
    let span = sysdoc_observability::query_span!("user fields", 5);
    let _guard = span.enter();
    let rerank = sysdoc_observability::rerank_span!("mock", 3usize);
    let _ = rerank.enter();
    let ingest = sysdoc_observability::ingestion_span!("doc1");
    drop(ingest);
    assert_eq!(names::QUERY, "sysdoc.query");
}

#[test]
fn tracked_degradations_serialize_with_status() {
    let mut tracker = DegradationTracker::new();
    tracker.record(DegradationEvent::now("rerank", "scorer unavailable", "merged_score"));
    let json = serde_json::to_value(&tracker.events()[0]).unwrap();
    assert_eq!(json["recovery_status"], "active");
    assert_eq!(json["event"]["component"], "rerank");

    tracker.mark_recovered("rerank");
    assert_eq!(tracker.events()[0].recovery_status, RecoveryStatus::Recovered);
}
