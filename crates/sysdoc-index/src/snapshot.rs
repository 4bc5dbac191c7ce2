//! JSON snapshots of the authoritative state, and recovery on load.
//!
//! The entity index is derived data: it is never written, and loading a
//! snapshot rebuilds it from the chunks.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysdoc_core::errors::{IndexError, SysdocResult};
use sysdoc_core::models::{Chunk, DocumentRecord, IndexStatus};
use tracing::{info, warn};

use crate::journal::IngestTask;
use crate::store::IndexStore;

pub const SNAPSHOT_VERSION: u32 = 1;

const INTERRUPTED: &str = "ingestion interrupted before commit";

/// Everything needed to restore an [`IndexStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub version: u32,
    pub taken_at: DateTime<Utc>,
    pub documents: Vec<DocumentRecord>,
    /// Chunks grouped by document, in document order.
    pub chunks: Vec<Chunk>,
    pub journal: Vec<IngestTask>,
}

/// What recovery did while restoring a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryReport {
    /// Tasks that never committed and were discarded.
    pub discarded_tasks: Vec<String>,
    pub restored_documents: usize,
    pub restored_chunks: usize,
    /// Chunks whose document is not registered.
    pub dropped_chunks: usize,
    pub indexed_entities: usize,
}

impl IndexStore {
    /// A consistent cut of chunks, registry and journal.
    pub fn snapshot(&self) -> SysdocResult<IndexSnapshot> {
        let _gate = self.exclusive()?;
        let documents = self.documents();
        let chunks = documents
            .iter()
            .flat_map(|doc| self.chunks_of_document(&doc.document_id))
            .map(|chunk| chunk.as_ref().clone())
            .collect();
        let mut journal: Vec<IngestTask> =
            self.journal.iter().map(|t| t.value().clone()).collect();
        journal.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        Ok(IndexSnapshot {
            version: SNAPSHOT_VERSION,
            taken_at: Utc::now(),
            documents,
            chunks,
            journal,
        })
    }

    /// Write a snapshot to `path`, replacing any previous file only once the
    /// new one is fully written.
    pub fn save_snapshot(&self, path: &Path) -> SysdocResult<()> {
        let snapshot = self.snapshot()?;
        let bytes = serde_json::to_vec(&snapshot)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        info!(
            path = %path.display(),
            documents = snapshot.documents.len(),
            chunks = snapshot.chunks.len(),
            "snapshot saved"
        );
        Ok(())
    }

    pub fn load_snapshot(path: &Path) -> SysdocResult<(Self, RecoveryReport)> {
        let raw = std::fs::read(path)?;
        let snapshot: IndexSnapshot = serde_json::from_slice(&raw)?;
        Self::from_snapshot(snapshot)
    }

    /// Restore a store. Pending tasks are discarded, documents they left
    /// pending are settled, and the entity index is rebuilt from the chunks.
    pub fn from_snapshot(snapshot: IndexSnapshot) -> SysdocResult<(Self, RecoveryReport)> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(IndexError::SnapshotError {
                reason: format!(
                    "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                    snapshot.version
                ),
            }
            .into());
        }

        let store = IndexStore::new();
        let mut report = RecoveryReport::default();

        for mut task in snapshot.journal {
            if task.is_pending() {
                task.discard(INTERRUPTED);
                report.discarded_tasks.push(task.task_id.clone());
            }
            let task_id = task.task_id.clone();
            store.journal.insert(task_id.clone(), task);
            store.retire(&task_id);
        }

        for record in snapshot.documents {
            store.documents.insert(record.document_id.clone(), record);
        }

        for chunk in snapshot.chunks {
            if !store.documents.contains_key(&chunk.document_id) {
                report.dropped_chunks += 1;
                continue;
            }
            if store.chunks.contains_key(&chunk.chunk_id) {
                warn!(chunk_id = %chunk.chunk_id, "duplicate chunk in snapshot dropped");
                report.dropped_chunks += 1;
                continue;
            }
            store
                .document_chunks
                .entry(chunk.document_id.clone())
                .or_default()
                .push(chunk.chunk_id.clone());
            let chunk = Arc::new(chunk);
            store.chunks.insert(chunk.chunk_id.clone(), Arc::clone(&chunk));
            store.entities.add(&chunk);
            report.restored_chunks += 1;
        }

        for mut record in store.documents.iter_mut() {
            let chunk_count = store
                .document_chunks
                .get(&record.document_id)
                .map(|ids| ids.len())
                .unwrap_or(0);
            match record.status {
                IndexStatus::Pending if chunk_count > 0 => {
                    record.status = IndexStatus::Indexed;
                    record.error = Some(INTERRUPTED.to_string());
                }
                IndexStatus::Pending => record.mark_failed(INTERRUPTED),
                IndexStatus::Indexed | IndexStatus::Failed => {}
            }
            record.chunk_count = chunk_count;
        }

        report.restored_documents = store.documents.len();
        report.indexed_entities = store.entities.len();
        info!(
            documents = report.restored_documents,
            chunks = report.restored_chunks,
            discarded_tasks = report.discarded_tasks.len(),
            dropped_chunks = report.dropped_chunks,
            "index recovered from snapshot"
        );
        Ok((store, report))
    }
}
