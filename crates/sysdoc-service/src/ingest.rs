//! Ingestion entrypoint.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sysdoc_chunking::Chunker;
use sysdoc_core::config::SysdocConfig;
use sysdoc_core::errors::{IndexError, ParseError, SysdocError, SysdocResult};
use sysdoc_core::models::{
    ChunkMetadata, DegradationEvent, DocType, DocumentRecord, EntityKind, StructureTree,
};
use sysdoc_core::traits::{DocumentFormat, IDocumentParser};
use sysdoc_embeddings::EmbeddingEngine;
use sysdoc_extraction::{detect_doc_type, EntityExtractor};
use sysdoc_index::{CommitSummary, IndexStats, IndexStore};
use sysdoc_observability::ingestion_span;
use sysdoc_observability::tracing_setup::events;
use tracing::debug;

/// Caller-supplied document attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestOptions {
    pub filename: String,
    /// Detected from the document text when absent.
    #[serde(default)]
    pub doc_type: Option<DocType>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl IngestOptions {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn with_doc_type(mut self, doc_type: DocType) -> Self {
        self.doc_type = Some(doc_type);
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Entities found in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySummary {
    /// Mentions per kind, keyed by `EntityKind::as_str`.
    pub by_kind: BTreeMap<String, usize>,
    pub canonical_names: BTreeSet<String>,
}

impl EntitySummary {
    fn from_counts(counts: &BTreeMap<EntityKind, usize>, names: &BTreeSet<String>) -> Self {
        Self {
            by_kind: counts
                .iter()
                .map(|(kind, n)| (kind.as_str().to_string(), *n))
                .collect(),
            canonical_names: names.clone(),
        }
    }

    pub fn total(&self) -> usize {
        self.by_kind.values().sum()
    }
}

/// Ingestion entrypoint output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub document_id: String,
    pub doc_type: DocType,
    pub chunk_count: usize,
    /// Chunks of an earlier ingestion that this one replaced.
    pub replaced: usize,
    pub entities: EntitySummary,
    /// True when chunks were embedded by a fallback provider.
    pub degraded: bool,
    #[serde(default)]
    pub degradations: Vec<DegradationEvent>,
}

impl IngestSummary {
    fn from_commit(
        commit: CommitSummary,
        doc_type: DocType,
        degraded: bool,
        degradations: Vec<DegradationEvent>,
    ) -> Self {
        Self {
            entities: EntitySummary::from_counts(&commit.entity_counts, &commit.canonical_names),
            document_id: commit.document_id,
            doc_type,
            chunk_count: commit.chunk_count,
            replaced: commit.replaced,
            degraded,
            degradations,
        }
    }
}

/// Turns documents into indexed chunks.
///
/// Every ingestion runs as one journaled task: the document is registered as
/// pending, its chunks are built off to the side and the store swaps them in
/// with one commit. Failures before the commit leave the previous chunks (if
/// any) serving.
pub struct DocumentService {
    store: Arc<IndexStore>,
    embeddings: Arc<EmbeddingEngine>,
    chunker: Chunker,
    extractor: EntityExtractor,
    parser: Option<Arc<dyn IDocumentParser>>,
}

impl DocumentService {
    pub fn new(
        store: Arc<IndexStore>,
        embeddings: Arc<EmbeddingEngine>,
        config: &SysdocConfig,
    ) -> SysdocResult<Self> {
        Ok(Self {
            store,
            embeddings,
            chunker: Chunker::new(config.chunking.clone())?,
            extractor: EntityExtractor::new(config.extraction.clone()),
            parser: None,
        })
    }

    pub fn with_parser(mut self, parser: Arc<dyn IDocumentParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    /// Index a parsed document. Re-ingesting an id replaces its chunks.
    pub fn ingest_tree(
        &self,
        mut tree: StructureTree,
        options: IngestOptions,
    ) -> SysdocResult<IngestSummary> {
        let document_id = tree.document_id.trim().to_string();
        if document_id.is_empty() {
            return Err(IndexError::IngestionFailed {
                document_id,
                reason: "document id is empty".to_string(),
            }
            .into());
        }
        tree.document_id = document_id.clone();
        let span = ingestion_span!(document_id);
        let _entered = span.enter();

        if !tree.validate_paths() {
            debug!("structure paths out of date, rebuilding");
            tree.rebuild_paths();
        }
        let doc_type = options
            .doc_type
            .unwrap_or_else(|| detect_doc_type(&tree.full_text()));

        let record = DocumentRecord::pending(
            document_id.clone(),
            options.filename.clone(),
            doc_type,
            options.tags.clone(),
        );
        let task_id = self.store.begin_ingest(record);

        let metadata = ChunkMetadata {
            doc_type,
            tags: options.tags,
            filename: options.filename,
        };
        let mut chunks = self.chunker.chunk(&tree, &metadata);
        for chunk in chunks.iter_mut() {
            self.extractor.extract_into(chunk);
        }
        debug!(chunks = chunks.len(), "chunked and extracted");

        let fallback = match self.embeddings.embed_chunks(&mut chunks) {
            Ok(fallback) => fallback,
            Err(e) => {
                self.abandon(&task_id, &document_id, &e);
                return Err(e);
            }
        };
        let degradations: Vec<DegradationEvent> = fallback.into_iter().collect();
        let degraded = !degradations.is_empty();
        for event in &degradations {
            events::degradation_triggered(&event.component, &event.failure, &event.fallback_used);
        }

        let commit = match self.store.commit(&task_id, chunks) {
            Ok(commit) => commit,
            Err(e) => {
                self.abandon(&task_id, &document_id, &e);
                return Err(e);
            }
        };
        let summary = IngestSummary::from_commit(commit, doc_type, degraded, degradations);
        events::document_ingested(
            &document_id,
            summary.chunk_count,
            summary.entities.canonical_names.len(),
        );
        Ok(summary)
    }

    /// Parse raw bytes with the configured parser, then index the tree.
    ///
    /// A parse failure registers the document as failed and returns the
    /// parser's error. No partial tree is ever indexed.
    pub fn ingest_raw(
        &self,
        document_id: &str,
        raw: &[u8],
        options: IngestOptions,
    ) -> SysdocResult<IngestSummary> {
        let parsed = self.parse(document_id, raw, &options.filename);
        match parsed {
            Ok(mut tree) => {
                tree.document_id = document_id.to_string();
                self.ingest_tree(tree, options)
            }
            Err(e) => {
                let record = DocumentRecord::pending(
                    document_id,
                    options.filename,
                    options.doc_type.unwrap_or_default(),
                    options.tags,
                );
                let task_id = self.store.begin_ingest(record);
                self.abandon(&task_id, document_id, &e);
                Err(e)
            }
        }
    }

    fn parse(&self, document_id: &str, raw: &[u8], filename: &str) -> SysdocResult<StructureTree> {
        let format = DocumentFormat::from_filename(filename).ok_or_else(|| {
            ParseError::UnsupportedFormat {
                format: filename.rsplit_once('.').map_or("", |(_, ext)| ext).to_string(),
            }
        })?;
        let parser = self.parser.as_ref().ok_or_else(|| {
            SysdocError::ConfigError("no document parser configured".to_string())
        })?;
        parser.parse(document_id, raw, format)
    }

    /// Re-index an existing document from a fresh tree, keeping its
    /// registered filename, type and tags.
    pub fn reindex(&self, tree: StructureTree) -> SysdocResult<IngestSummary> {
        let record = self
            .store
            .document(&tree.document_id)
            .ok_or_else(|| SysdocError::DocumentNotFound {
                document_id: tree.document_id.clone(),
            })?;
        let options = IngestOptions {
            filename: record.filename,
            doc_type: Some(record.doc_type),
            tags: record.tags,
        };
        self.ingest_tree(tree, options)
    }

    /// Remove a document with its chunks and entity entries.
    pub fn delete(&self, document_id: &str) -> SysdocResult<usize> {
        self.store.remove_document(document_id)
    }

    pub fn document(&self, document_id: &str) -> Option<DocumentRecord> {
        self.store.document(document_id)
    }

    pub fn documents(&self) -> Vec<DocumentRecord> {
        self.store.documents()
    }

    pub fn stats(&self) -> IndexStats {
        self.store.stats()
    }

    fn abandon(&self, task_id: &str, document_id: &str, error: &SysdocError) {
        let reason = error.to_string();
        self.store.fail_ingest(task_id, &reason);
        events::document_failed(document_id, &reason);
    }
}
