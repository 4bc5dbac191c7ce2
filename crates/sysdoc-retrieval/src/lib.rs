//! # sysdoc-retrieval
//!
//! Query-time pipeline over an indexed corpus:
//! hybrid search (dense cosine + BM25, min-max merged) → cross-encoder
//! rerank with a circuit breaker → one-hop cross-reference enrichment over
//! shared entities → result assembly with citations.
//!
//! Everything here is read-only against the index.

pub mod assembler;
pub mod cross_reference;
pub mod engine;
pub mod rerank;
pub mod search;

pub use assembler::ResultAssembler;
pub use cross_reference::{CrossReference, CrossReferenceEnricher};
pub use engine::{QueryEngine, QueryOutcome, QueryRequest};
pub use rerank::{BreakerState, CircuitBreaker, Permit, RerankOutcome, Reranker};
pub use search::HybridRetriever;
