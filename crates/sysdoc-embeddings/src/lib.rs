//! # sysdoc-embeddings
//!
//! Embedder-side plumbing for ingestion and queries.
//!
//! The embedding model itself is an external [`IEmbeddingProvider`]. This
//! crate chains it in front of a deterministic TF-IDF fallback so a vector
//! is always produced, records every fallback as a degradation event, and
//! caches query vectors.
//!
//! [`IEmbeddingProvider`]: sysdoc_core::traits::IEmbeddingProvider

pub mod cache;
pub mod degradation;
pub mod engine;
pub mod providers;
pub mod similarity;

pub use degradation::{DegradationChain, Embedded};
pub use engine::EmbeddingEngine;
pub use providers::TfIdfFallback;
