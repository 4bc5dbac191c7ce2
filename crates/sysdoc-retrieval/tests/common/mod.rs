#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sysdoc_chunking::Chunker;
use sysdoc_core::config::{ChunkingPolicy, EmbeddingConfig};
use sysdoc_core::errors::{RetrievalError, SysdocResult};
use sysdoc_core::models::{
    Chunk, ChunkMetadata, ContentType, DocumentRecord, EntityKind, EntityRef,
};
use sysdoc_core::traits::{ICrossEncoderScorer, IEmbeddingProvider};
use sysdoc_embeddings::EmbeddingEngine;
use sysdoc_extraction::EntityExtractor;
use sysdoc_index::IndexStore;
use test_fixtures::{load_all_documents, FixtureDocument};

pub fn embeddings() -> Arc<EmbeddingEngine> {
    Arc::new(EmbeddingEngine::new(EmbeddingConfig {
        dimensions: 384,
        query_cache_size: 100,
    }))
}

/// Chunk, extract, embed and index one fixture document.
pub fn ingest(store: &IndexStore, engine: &EmbeddingEngine, doc: &FixtureDocument) -> Vec<Chunk> {
    let metadata = ChunkMetadata {
        doc_type: doc.doc_type.unwrap_or_default(),
        tags: doc.tags.clone(),
        filename: doc.filename.clone(),
    };
    let mut chunks = Chunker::new(ChunkingPolicy::default())
        .unwrap()
        .chunk(&doc.tree(), &metadata);
    let extractor = EntityExtractor::default();
    for c in chunks.iter_mut() {
        extractor.extract_into(c);
    }
    engine.embed_chunks(&mut chunks).unwrap();
    let record = DocumentRecord::pending(
        doc.document_id.clone(),
        doc.filename.clone(),
        metadata.doc_type,
        doc.tags.clone(),
    );
    store.ingest(record, chunks.clone()).unwrap();
    chunks
}

/// Store holding every fixture document.
pub fn corpus() -> (Arc<IndexStore>, Arc<EmbeddingEngine>) {
    let store = Arc::new(IndexStore::new());
    let engine = embeddings();
    for doc in load_all_documents() {
        ingest(&store, &engine, &doc);
    }
    (store, engine)
}

/// Hand-built chunk carrying the given table-name entities.
pub fn entity_chunk(doc: &str, ordinal: usize, names: &[&str]) -> Chunk {
    let content = format!("{doc} part {ordinal}");
    Chunk {
        chunk_id: Chunk::compute_id(doc, ordinal, &content),
        document_id: doc.to_string(),
        content,
        content_type: ContentType::Text,
        section_path: vec![doc.to_string()],
        entities: names
            .iter()
            .map(|n| EntityRef::new(EntityKind::TableName, *n, *n))
            .collect::<BTreeSet<_>>(),
        dense_vector: None,
        overlap_chars: 0,
        metadata: ChunkMetadata {
            filename: format!("{doc}.md"),
            ..ChunkMetadata::default()
        },
        created_at: Utc::now(),
    }
}

pub fn record(doc: &str) -> DocumentRecord {
    DocumentRecord::pending(doc, format!("{doc}.md"), Default::default(), Vec::new())
}

/// Scores 1.0 for documents containing `needle`, 0.1 otherwise.
pub struct KeywordScorer {
    pub needle: &'static str,
    pub calls: AtomicUsize,
}

impl KeywordScorer {
    pub fn new(needle: &'static str) -> Self {
        Self {
            needle,
            calls: AtomicUsize::new(0),
        }
    }
}

impl ICrossEncoderScorer for KeywordScorer {
    fn score_batch(&self, _query: &str, documents: &[String]) -> SysdocResult<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(documents
            .iter()
            .map(|d| if d.contains(self.needle) { 1.0 } else { 0.1 })
            .collect())
    }

    fn name(&self) -> &str {
        "keyword-mock"
    }
}

/// Always unavailable.
pub struct DownScorer {
    pub calls: AtomicUsize,
}

impl DownScorer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl ICrossEncoderScorer for DownScorer {
    fn score_batch(&self, _query: &str, _documents: &[String]) -> SysdocResult<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RetrievalError::ScorerUnavailable {
            reason: "connection refused".to_string(),
        }
        .into())
    }

    fn name(&self) -> &str {
        "down-mock"
    }
}

/// Answers correctly, but too late.
pub struct SlowScorer(pub Duration);

impl ICrossEncoderScorer for SlowScorer {
    fn score_batch(&self, _query: &str, documents: &[String]) -> SysdocResult<Vec<f64>> {
        std::thread::sleep(self.0);
        Ok(vec![0.5; documents.len()])
    }

    fn name(&self) -> &str {
        "slow-mock"
    }
}

/// Scorer whose health is switched by the test: down, slow or healthy.
pub struct ScriptedScorer {
    mode: AtomicU8,
    delay: Duration,
}

impl ScriptedScorer {
    pub const DOWN: u8 = 0;
    pub const SLOW: u8 = 1;
    pub const HEALTHY: u8 = 2;

    pub fn new(delay: Duration) -> Self {
        Self {
            mode: AtomicU8::new(Self::DOWN),
            delay,
        }
    }

    pub fn set(&self, mode: u8) {
        self.mode.store(mode, Ordering::SeqCst);
    }
}

impl ICrossEncoderScorer for ScriptedScorer {
    fn score_batch(&self, _query: &str, documents: &[String]) -> SysdocResult<Vec<f64>> {
        match self.mode.load(Ordering::SeqCst) {
            Self::DOWN => Err(RetrievalError::ScorerUnavailable {
                reason: "connection refused".to_string(),
            }
            .into()),
            Self::SLOW => {
                std::thread::sleep(self.delay);
                Ok(vec![0.5; documents.len()])
            }
            _ => Ok(vec![0.5; documents.len()]),
        }
    }

    fn name(&self) -> &str {
        "scripted-mock"
    }
}

/// Remote-style embedder that blocks its caller.
pub struct SlowEmbedder(pub Duration);

impl IEmbeddingProvider for SlowEmbedder {
    fn embed(&self, _text: &str) -> SysdocResult<Vec<f32>> {
        std::thread::sleep(self.0);
        Ok(vec![1.0; 384])
    }

    fn dimensions(&self) -> usize {
        384
    }

    fn name(&self) -> &str {
        "slow-embedder"
    }

    fn is_available(&self) -> bool {
        true
    }
}
