//! SysdocRuntime: owns the store, the engines and the background checker.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sysdoc_core::config::SysdocConfig;
use sysdoc_core::errors::{SysdocError, SysdocResult};
use sysdoc_core::traits::{
    IChunkSource, ICrossEncoderScorer, IDocumentParser, IEmbeddingProvider, IGenerator,
};
use sysdoc_embeddings::EmbeddingEngine;
use sysdoc_index::{IndexStore, RecoveryReport};
use sysdoc_observability::init_tracing;
use sysdoc_retrieval::QueryEngine;
use tokio::task::JoinHandle;
use tracing::info;

use crate::checker::ConsistencyChecker;
use crate::ingest::DocumentService;
use crate::query::QueryService;

/// Options for building a runtime. Every collaborator is optional.
#[derive(Default)]
pub struct RuntimeOptions {
    /// TOML configuration. If None, uses defaults.
    pub config_toml: Option<String>,
    /// Snapshot file restored at startup (when present) and written by
    /// [`SysdocRuntime::save_snapshot`].
    pub snapshot_path: Option<PathBuf>,
    /// Install the global tracing subscriber from the observability config.
    pub init_tracing: bool,
    pub embedding_provider: Option<Arc<dyn IEmbeddingProvider>>,
    pub scorer: Option<Arc<dyn ICrossEncoderScorer>>,
    pub generator: Option<Arc<dyn IGenerator>>,
    pub parser: Option<Arc<dyn IDocumentParser>>,
}

pub struct SysdocRuntime {
    config: SysdocConfig,
    store: Arc<IndexStore>,
    embeddings: Arc<EmbeddingEngine>,
    documents: DocumentService,
    queries: QueryService,
    checker: Arc<ConsistencyChecker>,
    snapshot_path: Option<PathBuf>,
    recovery: Option<RecoveryReport>,
}

impl SysdocRuntime {
    pub fn new(opts: RuntimeOptions) -> SysdocResult<Self> {
        let config = match &opts.config_toml {
            Some(toml_str) => SysdocConfig::from_toml(toml_str)?,
            None => SysdocConfig::default(),
        };
        if opts.init_tracing {
            init_tracing(&config.observability);
        }

        let (store, recovery) = match opts.snapshot_path.as_deref().filter(|p| p.exists()) {
            Some(path) => {
                let (store, report) = IndexStore::load_snapshot(path)?;
                info!(
                    documents = report.restored_documents,
                    chunks = report.restored_chunks,
                    discarded_tasks = report.discarded_tasks.len(),
                    "index restored from snapshot"
                );
                (Arc::new(store), Some(report))
            }
            None => (Arc::new(IndexStore::new()), None),
        };

        let embeddings = Arc::new(match opts.embedding_provider {
            Some(primary) => EmbeddingEngine::with_provider(config.embedding.clone(), primary),
            None => EmbeddingEngine::new(config.embedding.clone()),
        });

        let mut documents =
            DocumentService::new(Arc::clone(&store), Arc::clone(&embeddings), &config)?;
        if let Some(parser) = opts.parser {
            documents = documents.with_parser(parser);
        }

        let source: Arc<dyn IChunkSource> = store.clone();
        let mut engine = QueryEngine::new(source, Arc::clone(&embeddings), &config);
        if let Some(scorer) = opts.scorer {
            engine = engine.with_scorer(scorer);
        }
        let mut queries = QueryService::new(engine);
        if let Some(generator) = opts.generator {
            queries = queries.with_generator(generator);
        }

        let checker = Arc::new(ConsistencyChecker::new(
            Arc::clone(&store),
            config.index.clone(),
        ));

        Ok(Self {
            config,
            store,
            embeddings,
            documents,
            queries,
            checker,
            snapshot_path: opts.snapshot_path,
            recovery,
        })
    }

    pub fn config(&self) -> &SysdocConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn embeddings(&self) -> &Arc<EmbeddingEngine> {
        &self.embeddings
    }

    pub fn documents(&self) -> &DocumentService {
        &self.documents
    }

    pub fn queries(&self) -> &QueryService {
        &self.queries
    }

    pub fn checker(&self) -> &Arc<ConsistencyChecker> {
        &self.checker
    }

    /// What startup recovery did, if a snapshot was restored.
    pub fn recovery(&self) -> Option<&RecoveryReport> {
        self.recovery.as_ref()
    }

    /// Start the background consistency checker.
    pub fn start_maintenance(&self) -> JoinHandle<()> {
        Arc::clone(&self.checker).start()
    }

    pub fn shutdown(&self) {
        self.checker.shutdown();
    }

    /// Write the store to the configured snapshot path.
    pub fn save_snapshot(&self) -> SysdocResult<&Path> {
        let path = self
            .snapshot_path
            .as_deref()
            .ok_or_else(|| SysdocError::ConfigError("no snapshot path configured".to_string()))?;
        self.store.save_snapshot(path)?;
        info!(path = %path.display(), "index snapshot saved");
        Ok(path)
    }
}
