//! EmbeddingEngine: the entry point of sysdoc-embeddings.
//!
//! Fills chunk vectors at ingestion time and query vectors at query time,
//! always through the fallback chain. Implements `IEmbeddingProvider`.

use std::sync::Arc;

use sysdoc_core::config::EmbeddingConfig;
use sysdoc_core::errors::SysdocResult;
use sysdoc_core::models::{Chunk, DegradationEvent};
use sysdoc_core::traits::IEmbeddingProvider;
use tracing::{debug, info};

use crate::cache::QueryCache;
use crate::degradation::{DegradationChain, Embedded};
use crate::providers::TfIdfFallback;

pub struct EmbeddingEngine {
    chain: DegradationChain,
    cache: QueryCache,
    config: EmbeddingConfig,
}

impl EmbeddingEngine {
    /// Engine backed by the TF-IDF fallback alone.
    pub fn new(config: EmbeddingConfig) -> Self {
        Self::build(config, None)
    }

    /// Engine that tries `primary` first and falls back to TF-IDF.
    pub fn with_provider(config: EmbeddingConfig, primary: Arc<dyn IEmbeddingProvider>) -> Self {
        Self::build(config, Some(primary))
    }

    fn build(config: EmbeddingConfig, primary: Option<Arc<dyn IEmbeddingProvider>>) -> Self {
        let mut chain = DegradationChain::new(config.dimensions);
        if let Some(primary) = primary {
            chain.push(primary);
        }
        chain.push(Arc::new(TfIdfFallback::new(config.dimensions)));

        info!(
            provider = chain.active_provider_name(),
            dims = config.dimensions,
            "EmbeddingEngine initialized"
        );

        Self {
            chain,
            cache: QueryCache::new(config.query_cache_size),
            config,
        }
    }

    /// Embed one chunk's section-enriched text into its `dense_vector`.
    /// Returns the fallback taken, if any.
    pub fn embed_chunk(&self, chunk: &mut Chunk) -> SysdocResult<Option<DegradationEvent>> {
        let out = self.chain.embed(&chunk.embedding_text())?;
        chunk.dense_vector = Some(out.value);
        Ok(out.event)
    }

    /// Embed a batch of chunks with a single provider. Returns the fallback
    /// taken, if any.
    pub fn embed_chunks(&self, chunks: &mut [Chunk]) -> SysdocResult<Option<DegradationEvent>> {
        if chunks.is_empty() {
            return Ok(None);
        }
        let texts: Vec<String> = chunks.iter().map(Chunk::embedding_text).collect();
        let Embedded {
            value,
            provider,
            degraded,
            event,
        } = self.chain.embed_batch(&texts)?;
        for (chunk, vector) in chunks.iter_mut().zip(value) {
            chunk.dense_vector = Some(vector);
        }
        debug!(count = chunks.len(), provider = %provider, degraded, "chunks embedded");
        Ok(event)
    }

    /// Embed a query. Vectors from the first provider are cached; fallback
    /// vectors are not, so the primary is retried on the next call.
    pub fn embed_query(&self, query: &str) -> SysdocResult<Embedded<Vec<f32>>> {
        if let Some(vector) = self.cache.get(query) {
            debug!("query embedding cache hit");
            return Ok(Embedded {
                value: vector,
                provider: "cache".to_string(),
                degraded: false,
                event: None,
            });
        }
        let out = self.chain.embed(query)?;
        if !out.degraded {
            self.cache.insert(query, out.value.clone());
        }
        Ok(out)
    }

    pub fn active_provider(&self) -> &str {
        self.chain.active_provider_name()
    }

    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }
}

impl IEmbeddingProvider for EmbeddingEngine {
    fn embed(&self, text: &str) -> SysdocResult<Vec<f32>> {
        Ok(self.chain.embed(text)?.value)
    }

    fn embed_batch(&self, texts: &[String]) -> SysdocResult<Vec<Vec<f32>>> {
        Ok(self.chain.embed_batch(texts)?.value)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "sysdoc-embedding-engine"
    }

    fn is_available(&self) -> bool {
        true
    }
}
