use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use sysdoc_core::config::EmbeddingConfig;
use sysdoc_core::errors::{EmbeddingError, SysdocResult};
use sysdoc_core::models::{Chunk, ChunkMetadata, ContentType};
use sysdoc_core::traits::IEmbeddingProvider;
use sysdoc_embeddings::similarity::cosine_similarity;
use sysdoc_embeddings::EmbeddingEngine;

const DIMS: usize = 32;

/// Primary provider that can be switched off mid-test.
struct SwitchableProvider {
    up: AtomicBool,
    calls: AtomicUsize,
}

impl SwitchableProvider {
    fn new(up: bool) -> Self {
        Self {
            up: AtomicBool::new(up),
            calls: AtomicUsize::new(0),
        }
    }
}

impl IEmbeddingProvider for SwitchableProvider {
    fn embed(&self, _text: &str) -> SysdocResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.up.load(Ordering::SeqCst) {
            let mut v = vec![0.0; DIMS];
            v[0] = 1.0;
            Ok(v)
        } else {
            Err(EmbeddingError::ProviderUnavailable {
                provider: "remote".to_string(),
            }
            .into())
        }
    }
    fn dimensions(&self) -> usize {
        DIMS
    }
    fn name(&self) -> &str {
        "remote"
    }
    fn is_available(&self) -> bool {
        true
    }
}

fn config() -> EmbeddingConfig {
    EmbeddingConfig {
        dimensions: DIMS,
        query_cache_size: 100,
    }
}

fn chunk(id: &str, content: &str) -> Chunk {
    Chunk {
        chunk_id: id.to_string(),
        document_id: "doc".to_string(),
        content: content.to_string(),
        content_type: ContentType::Text,
        section_path: vec!["Users".to_string()],
        entities: Default::default(),
        dense_vector: None,
        overlap_chars: 0,
        metadata: ChunkMetadata::default(),
        created_at: Utc::now(),
    }
}

#[test]
fn chunks_get_vectors_of_configured_length() {
    let engine = EmbeddingEngine::new(config());
    let mut chunks = vec![chunk("a", "create a user"), chunk("b", "delete an order")];
    let fallback = engine.embed_chunks(&mut chunks).unwrap();
    assert!(fallback.is_none());
    for c in &chunks {
        assert_eq!(c.dense_vector.as_ref().map(Vec::len), Some(DIMS));
    }
}

#[test]
fn embedding_is_stable_across_engines() {
    let mut a = chunk("a", "list user accounts");
    let mut b = chunk("a", "list user accounts");
    EmbeddingEngine::new(config()).embed_chunk(&mut a).unwrap();
    EmbeddingEngine::new(config()).embed_chunk(&mut b).unwrap();
    assert_eq!(a.dense_vector, b.dense_vector);
}

#[test]
fn section_path_contributes_to_chunk_vector() {
    let engine = EmbeddingEngine::new(config());
    let mut c = chunk("a", "body text here");
    engine.embed_chunk(&mut c).unwrap();
    let plain = engine.embed_query("body text here").unwrap().value;
    let enriched = c.dense_vector.unwrap();
    assert_ne!(plain, enriched);
    assert!(cosine_similarity(&plain, &enriched) > 0.0);
}

#[test]
fn primary_outage_degrades_to_tfidf_and_skips_cache() {
    let primary = Arc::new(SwitchableProvider::new(false));
    let engine = EmbeddingEngine::with_provider(config(), primary.clone());

    let first = engine.embed_query("user registration").unwrap();
    assert!(first.degraded);
    assert_eq!(first.provider, "tfidf-fallback");
    assert_eq!(first.event.unwrap().component, "embeddings");

    primary.up.store(true, Ordering::SeqCst);
    let second = engine.embed_query("user registration").unwrap();
    assert!(!second.degraded);
    assert_eq!(second.provider, "remote");
    assert_eq!(primary.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn healthy_primary_is_used_for_chunks() {
    let primary = Arc::new(SwitchableProvider::new(true));
    let engine = EmbeddingEngine::with_provider(config(), primary);
    let mut c = chunk("a", "anything");
    assert!(engine.embed_chunk(&mut c).unwrap().is_none());
    assert_eq!(c.dense_vector.unwrap()[0], 1.0);
}
