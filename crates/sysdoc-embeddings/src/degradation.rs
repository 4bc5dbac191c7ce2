//! Fallback chain for embedding generation.
//!
//! Providers are tried in order. A provider that errors, reports itself
//! unavailable or returns vectors of the wrong length is skipped. A call
//! served by a fallback carries its own [`DegradationEvent`], so concurrent
//! callers never see each other's fallbacks.

use std::sync::Arc;

use sysdoc_core::errors::{EmbeddingError, SysdocError, SysdocResult};
use sysdoc_core::models::DegradationEvent;
use sysdoc_core::traits::IEmbeddingProvider;
use tracing::warn;

/// Vectors plus the provider that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedded<T> {
    pub value: T,
    pub provider: String,
    /// True when a provider other than the first produced the value.
    pub degraded: bool,
    /// The fallback taken by this call, if any.
    pub event: Option<DegradationEvent>,
}

/// Ordered provider chain, shareable across threads.
pub struct DegradationChain {
    chain: Vec<Arc<dyn IEmbeddingProvider>>,
    dimensions: usize,
}

impl DegradationChain {
    /// An empty chain expecting vectors of `dimensions`.
    pub fn new(dimensions: usize) -> Self {
        Self {
            chain: Vec::new(),
            dimensions,
        }
    }

    /// Append a provider with the lowest priority so far.
    pub fn push(&mut self, provider: Arc<dyn IEmbeddingProvider>) {
        self.chain.push(provider);
    }

    /// Embed one text with the first provider that succeeds.
    pub fn embed(&self, text: &str) -> SysdocResult<Embedded<Vec<f32>>> {
        self.run(|provider| {
            let vector = provider.embed(text)?;
            self.check_dimensions(&vector)?;
            Ok(vector)
        })
    }

    /// Embed a batch with the first provider that succeeds for all texts.
    /// The whole batch comes from one provider.
    pub fn embed_batch(&self, texts: &[String]) -> SysdocResult<Embedded<Vec<Vec<f32>>>> {
        self.run(|provider| {
            let vectors = provider.embed_batch(texts)?;
            if vectors.len() != texts.len() {
                return Err(EmbeddingError::InferenceFailed {
                    reason: format!("{} vectors for {} texts", vectors.len(), texts.len()),
                }
                .into());
            }
            for vector in &vectors {
                self.check_dimensions(vector)?;
            }
            Ok(vectors)
        })
    }

    fn check_dimensions(&self, vector: &[f32]) -> SysdocResult<()> {
        if vector.len() != self.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            }
            .into());
        }
        Ok(())
    }

    fn run<T>(
        &self,
        attempt: impl Fn(&dyn IEmbeddingProvider) -> SysdocResult<T>,
    ) -> SysdocResult<Embedded<T>> {
        let mut failures: Vec<String> = Vec::new();
        let mut last_error: Option<SysdocError> = None;

        for (i, provider) in self.chain.iter().enumerate() {
            if !provider.is_available() {
                failures.push(format!("{} unavailable", provider.name()));
                continue;
            }
            match attempt(provider.as_ref()) {
                Ok(value) => {
                    let event = (i > 0).then(|| {
                        DegradationEvent::now("embeddings", failures.join("; "), provider.name())
                    });
                    return Ok(Embedded {
                        value,
                        provider: provider.name().to_string(),
                        degraded: event.is_some(),
                        event,
                    });
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "provider failed, trying next in chain"
                    );
                    failures.push(format!("{}: {e}", provider.name()));
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            EmbeddingError::ProviderUnavailable {
                provider: format!("all {} providers exhausted", self.chain.len()),
            }
            .into()
        }))
    }

    /// Name of the first available provider.
    pub fn active_provider_name(&self) -> &str {
        self.chain
            .iter()
            .find(|p| p.is_available())
            .map(|p| p.name())
            .unwrap_or("none")
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;
    impl IEmbeddingProvider for FailingProvider {
        fn embed(&self, _text: &str) -> SysdocResult<Vec<f32>> {
            Err(EmbeddingError::InferenceFailed {
                reason: "model crashed".to_string(),
            }
            .into())
        }
        fn dimensions(&self) -> usize {
            8
        }
        fn name(&self) -> &str {
            "failing-mock"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    struct FixedProvider {
        name: &'static str,
        dims: usize,
    }
    impl IEmbeddingProvider for FixedProvider {
        fn embed(&self, _text: &str) -> SysdocResult<Vec<f32>> {
            Ok(vec![1.0; self.dims])
        }
        fn dimensions(&self) -> usize {
            self.dims
        }
        fn name(&self) -> &str {
            self.name
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    fn chain(providers: Vec<Arc<dyn IEmbeddingProvider>>) -> DegradationChain {
        let mut chain = DegradationChain::new(8);
        for p in providers {
            chain.push(p);
        }
        chain
    }

    #[test]
    fn primary_success_is_not_degraded() {
        let chain = chain(vec![
            Arc::new(FixedProvider { name: "primary", dims: 8 }),
            Arc::new(FixedProvider { name: "fallback", dims: 8 }),
        ]);
        let out = chain.embed("x").unwrap();
        assert_eq!(out.provider, "primary");
        assert!(!out.degraded);
        assert!(out.event.is_none());
    }

    #[test]
    fn failure_falls_back_and_records_event() {
        let chain = chain(vec![
            Arc::new(FailingProvider),
            Arc::new(FixedProvider { name: "fallback", dims: 8 }),
        ]);
        let out = chain.embed("x").unwrap();
        assert!(out.degraded);
        let event = out.event.unwrap();
        assert_eq!(event.fallback_used, "fallback");
        assert!(event.failure.contains("model crashed"));
    }

    #[test]
    fn events_stay_with_their_call() {
        let chain = chain(vec![
            Arc::new(FailingProvider),
            Arc::new(FixedProvider { name: "fallback", dims: 8 }),
        ]);
        let per_call: Vec<usize> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..4)
                .map(|_| s.spawn(|| chain.embed("x").unwrap().event.into_iter().count()))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        assert_eq!(per_call, vec![1; 4]);

        let batch = chain.embed_batch(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(batch.event.map(|e| e.fallback_used).as_deref(), Some("fallback"));
    }

    #[test]
    fn wrong_dimensions_count_as_failure() {
        let chain = chain(vec![
            Arc::new(FixedProvider { name: "wide", dims: 16 }),
            Arc::new(FixedProvider { name: "fallback", dims: 8 }),
        ]);
        let out = chain.embed_batch(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(out.provider, "fallback");
        assert_eq!(out.value.len(), 2);
    }

    #[test]
    fn exhausted_chain_errors() {
        let chain = chain(vec![Arc::new(FailingProvider)]);
        let err = chain.embed("x").unwrap_err();
        assert!(err.is_transient());
        assert!(DegradationChain::new(8).embed("x").is_err());
    }
}
