//! # sysdoc-observability
//!
//! Structured tracing with span definitions for ingestion, queries and
//! reranking, plus tracking of degradation events and their recovery.

pub mod degradation;
pub mod tracing_setup;

pub use degradation::{DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use tracing_setup::init_tracing;
