//! Test fixture loader for sample documents and query scenarios.
//!
//! Fixtures live in the workspace-level `test-fixtures/` folder:
//! `documents/*.json` hold parsed structure trees with their ingestion
//! metadata, `queries/*.json` hold expected query outcomes.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use sysdoc_core::models::{DocType, StructureNode, StructureTree};

/// Root directory of the fixtures folder.
fn fixtures_root() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    // The fixture crate shares the folder name, so look for the data inside.
    while !path.join("test-fixtures").join("documents").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures directory from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// All JSON files of a fixture subdirectory, sorted by name.
pub fn list_fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = fixtures_root().join(subdir);
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read directory {}: {}", dir.display(), e))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.extension().is_some_and(|ext| ext == "json").then_some(path)
        })
        .collect();
    files.sort();
    files
}

/// A parsed sample document plus the metadata an ingestion caller supplies.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureDocument {
    pub document_id: String,
    pub filename: String,
    /// Absent means the pipeline detects it.
    #[serde(default)]
    pub doc_type: Option<DocType>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub nodes: Vec<StructureNode>,
}

impl FixtureDocument {
    /// The structure tree with paths derived from the heading hierarchy.
    pub fn tree(&self) -> StructureTree {
        StructureTree::new(self.document_id.clone(), self.nodes.clone())
    }
}

/// Load `documents/<name>.json`.
pub fn load_document(name: &str) -> FixtureDocument {
    load_fixture(&format!("documents/{name}.json"))
}

/// Every sample document, sorted by file name.
pub fn load_all_documents() -> Vec<FixtureDocument> {
    list_fixtures("documents")
        .into_iter()
        .map(|path| {
            let content = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
            serde_json::from_str(&content)
                .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
        })
        .collect()
}

/// Expected outcome of one query over the sample documents.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryScenario {
    pub name: String,
    pub query: String,
    pub top_k: usize,
    /// Document of the first primary result.
    pub expected_primary: String,
    /// Documents expected among the cross-references.
    #[serde(default)]
    pub expected_cross_references: Vec<String>,
}

/// Load `queries/scenarios.json`.
pub fn load_query_scenarios() -> Vec<QueryScenario> {
    load_fixture("queries/scenarios.json")
}
