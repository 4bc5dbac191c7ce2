#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use sysdoc_core::errors::{ParseError, RetrievalError, SysdocResult};
use sysdoc_core::models::{GenerationRequest, StructureNode, StructureTree};
use sysdoc_core::traits::{DocumentFormat, ICrossEncoderScorer, IDocumentParser, IGenerator};
use sysdoc_service::{IngestOptions, RuntimeOptions, SysdocRuntime};
use test_fixtures::{load_all_documents, FixtureDocument};

pub fn options_for(doc: &FixtureDocument) -> IngestOptions {
    let mut options = IngestOptions::new(doc.filename.clone()).with_tags(doc.tags.clone());
    options.doc_type = doc.doc_type;
    options
}

/// Ingest every fixture document through the service.
pub fn ingest_fixtures(runtime: &SysdocRuntime) {
    for doc in load_all_documents() {
        runtime
            .documents()
            .ingest_tree(doc.tree(), options_for(&doc))
            .unwrap();
    }
}

pub fn runtime_with(opts: RuntimeOptions) -> SysdocRuntime {
    let runtime = SysdocRuntime::new(opts).unwrap();
    ingest_fixtures(&runtime);
    runtime
}

pub fn runtime() -> SysdocRuntime {
    runtime_with(RuntimeOptions::default())
}

pub fn snapshot_options(path: PathBuf) -> RuntimeOptions {
    RuntimeOptions {
        snapshot_path: Some(path),
        ..RuntimeOptions::default()
    }
}

/// Echoes the rendered prompt and keeps every request it saw.
#[derive(Default)]
pub struct EchoGenerator {
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl IGenerator for EchoGenerator {
    fn generate(&self, request: &GenerationRequest) -> SysdocResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(request.render_prompt())
    }

    fn name(&self) -> &str {
        "echo-mock"
    }
}

/// Fails with `ScorerUnavailable` until switched on.
pub struct SwitchableScorer {
    pub healthy: AtomicBool,
    pub calls: AtomicUsize,
}

impl SwitchableScorer {
    pub fn down() -> Self {
        Self {
            healthy: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }
}

impl ICrossEncoderScorer for SwitchableScorer {
    fn score_batch(&self, _query: &str, documents: &[String]) -> SysdocResult<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.healthy.load(Ordering::SeqCst) {
            return Err(RetrievalError::ScorerUnavailable {
                reason: "connection refused".to_string(),
            }
            .into());
        }
        Ok(vec![0.5; documents.len()])
    }

    fn name(&self) -> &str {
        "switchable-mock"
    }
}

/// Reads a JSON array of structure nodes from markdown-named input.
pub struct JsonTreeParser;

impl IDocumentParser for JsonTreeParser {
    fn parse(
        &self,
        document_id: &str,
        raw: &[u8],
        format: DocumentFormat,
    ) -> SysdocResult<StructureTree> {
        if format != DocumentFormat::Markdown {
            return Err(ParseError::UnsupportedFormat {
                format: format!("{format:?}"),
            }
            .into());
        }
        let nodes: Vec<StructureNode> =
            serde_json::from_slice(raw).map_err(|e| ParseError::CorruptDocument {
                document_id: document_id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(StructureTree::new(document_id, nodes))
    }
}
