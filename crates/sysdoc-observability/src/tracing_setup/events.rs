//! Structured log events for key pipeline operations.

pub fn document_ingested(document_id: &str, chunks: usize, entities: usize) {
    tracing::info!(
        event = "document_ingested",
        document_id = %document_id,
        chunks,
        entities,
        "document ingested"
    );
}

pub fn document_failed(document_id: &str, reason: &str) {
    tracing::warn!(
        event = "document_failed",
        document_id = %document_id,
        reason = %reason,
        "document ingestion failed"
    );
}

pub fn query_completed(results: usize, citations: usize, degraded: bool, latency_ms: u128) {
    tracing::info!(
        event = "query_completed",
        results,
        citations,
        degraded,
        latency_ms = latency_ms as u64,
        "query completed"
    );
}

pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

pub fn degradation_recovered(component: &str) {
    tracing::info!(
        event = "degradation_recovered",
        component = %component,
        "component recovered"
    );
}

pub fn index_repaired(violations: usize) {
    tracing::warn!(event = "index_repaired", violations, "index inconsistency repaired");
}
