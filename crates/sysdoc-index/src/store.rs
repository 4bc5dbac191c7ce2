use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::sync::{
    Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError,
};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sysdoc_core::errors::{IndexError, SysdocError, SysdocResult};
use sysdoc_core::models::{Chunk, DocumentRecord, EntityKind, IndexStatus, QueryFilters};
use sysdoc_core::traits::IChunkSource;
use tracing::{debug, info, warn};

use crate::entity_index::EntityIndex;
use crate::journal::IngestTask;
use crate::stats::IndexStats;

/// Finished (committed or discarded) tasks kept in the journal. Pending
/// tasks are always kept; recovery only needs those.
pub const FINISHED_TASKS_RETAINED: usize = 64;

/// What one committed ingestion wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub document_id: String,
    pub task_id: String,
    pub chunk_count: usize,
    /// Chunks of a previous ingestion of the same document that were replaced.
    pub replaced: usize,
    pub entity_counts: BTreeMap<EntityKind, usize>,
    pub canonical_names: BTreeSet<String>,
}

/// Authoritative chunk store with its entity index, document registry and
/// ingestion journal.
///
/// A chunk is inserted before its entity entries and its entity entries are
/// removed before the chunk, so the index never references a missing chunk.
/// Mutations share `gate`; consistency passes and snapshots take it
/// exclusively. Queries never touch it.
#[derive(Debug, Default)]
pub struct IndexStore {
    pub(crate) chunks: DashMap<String, Arc<Chunk>>,
    /// document_id → chunk ids in document order.
    pub(crate) document_chunks: DashMap<String, Vec<String>>,
    pub(crate) documents: DashMap<String, DocumentRecord>,
    pub(crate) journal: DashMap<String, IngestTask>,
    /// Finished task ids, oldest first.
    finished: Mutex<VecDeque<String>>,
    pub(crate) entities: EntityIndex,
    gate: RwLock<()>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn shared(&self) -> SysdocResult<RwLockReadGuard<'_, ()>> {
        self.gate
            .read()
            .map_err(|e| SysdocError::ConcurrencyError(format!("index gate poisoned: {e}")))
    }

    pub(crate) fn exclusive(&self) -> SysdocResult<RwLockWriteGuard<'_, ()>> {
        self.gate
            .write()
            .map_err(|e| SysdocError::ConcurrencyError(format!("index gate poisoned: {e}")))
    }

    /// Wait at most `grace` for in-flight mutations to drain.
    pub(crate) fn exclusive_within(
        &self,
        grace: Duration,
    ) -> SysdocResult<Option<RwLockWriteGuard<'_, ()>>> {
        let started = Instant::now();
        loop {
            match self.gate.try_write() {
                Ok(guard) => return Ok(Some(guard)),
                Err(TryLockError::WouldBlock) if started.elapsed() < grace => {
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(TryLockError::WouldBlock) => return Ok(None),
                Err(TryLockError::Poisoned(e)) => {
                    return Err(SysdocError::ConcurrencyError(format!(
                        "index gate poisoned: {e}"
                    )))
                }
            }
        }
    }

    // ── Ingestion ─────────────────────────────────────────────────────────

    /// Open an ingestion task and register the document as pending.
    ///
    /// A document that already has chunks keeps serving them until the new
    /// task commits.
    pub fn begin_ingest(&self, record: DocumentRecord) -> String {
        let task = IngestTask::begin(record.document_id.clone());
        let task_id = task.task_id.clone();
        self.journal.insert(task_id.clone(), task);
        self.documents
            .entry(record.document_id.clone())
            .and_modify(|existing| {
                existing.filename = record.filename.clone();
                existing.doc_type = record.doc_type;
                existing.tags = record.tags.clone();
                existing.status = IndexStatus::Pending;
                existing.error = None;
            })
            .or_insert(record);
        debug!(task_id = %task_id, "ingestion task started");
        task_id
    }

    /// Atomically replace the document's chunks with `chunks` and index
    /// their entities. Nothing is written when validation fails.
    pub fn commit(&self, task_id: &str, chunks: Vec<Chunk>) -> SysdocResult<CommitSummary> {
        let _gate = self.shared()?;

        let document_id = match self.journal.get(task_id) {
            Some(task) if task.is_pending() => task.document_id.clone(),
            Some(task) => {
                return Err(IndexError::IngestionFailed {
                    document_id: task.document_id.clone(),
                    reason: format!("task {task_id} is already {:?}", task.state),
                }
                .into())
            }
            None => {
                return Err(IndexError::IngestionFailed {
                    document_id: String::new(),
                    reason: format!("unknown task {task_id}"),
                }
                .into())
            }
        };

        let mut batch_ids = HashSet::with_capacity(chunks.len());
        for chunk in &chunks {
            if chunk.document_id != document_id {
                return Err(IndexError::DocumentMismatch {
                    chunk_id: chunk.chunk_id.clone(),
                    expected: document_id,
                    actual: chunk.document_id.clone(),
                }
                .into());
            }
            let foreign = self
                .chunks
                .get(&chunk.chunk_id)
                .is_some_and(|existing| existing.document_id != document_id);
            if foreign || !batch_ids.insert(chunk.chunk_id.clone()) {
                return Err(IndexError::DuplicateChunk {
                    chunk_id: chunk.chunk_id.clone(),
                }
                .into());
            }
        }

        // Holding the listing entry serializes commits of one document.
        let mut listing = self.document_chunks.entry(document_id.clone()).or_default();
        let old_ids = std::mem::take(&mut *listing);
        let replaced = old_ids.len();
        for id in &old_ids {
            if let Some(old) = self.chunks.get(id).map(|c| Arc::clone(c.value())) {
                self.detach(&old);
            }
        }

        let mut summary = CommitSummary {
            document_id: document_id.clone(),
            task_id: task_id.to_string(),
            chunk_count: chunks.len(),
            replaced,
            entity_counts: BTreeMap::new(),
            canonical_names: BTreeSet::new(),
        };
        let mut ids = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            for entity in &chunk.entities {
                *summary.entity_counts.entry(entity.entity_kind).or_insert(0) += 1;
                summary.canonical_names.insert(entity.canonical_name.clone());
            }
            let chunk = Arc::new(chunk);
            ids.push(chunk.chunk_id.clone());
            self.chunks.insert(chunk.chunk_id.clone(), Arc::clone(&chunk));
            self.entities.add(&chunk);
        }
        *listing = ids.clone();
        drop(listing);

        if let Some(mut record) = self.documents.get_mut(&document_id) {
            record.mark_indexed(ids.len());
        }
        if let Some(mut task) = self.journal.get_mut(task_id) {
            task.commit(ids);
        }
        self.retire(task_id);

        info!(
            document_id = %document_id,
            chunks = summary.chunk_count,
            replaced,
            entities = summary.canonical_names.len(),
            "document committed"
        );
        Ok(summary)
    }

    /// Abandon a pending task. A document that still has committed chunks
    /// stays indexed with the failure recorded; otherwise it is marked failed.
    /// Finished or unknown tasks are left alone.
    pub fn fail_ingest(&self, task_id: &str, reason: &str) {
        let discarded = self.journal.get_mut(task_id).and_then(|mut task| {
            task.is_pending().then(|| {
                task.discard(reason);
                task.document_id.clone()
            })
        });
        let Some(document_id) = discarded else {
            return;
        };
        self.retire(task_id);
        let has_chunks = self
            .document_chunks
            .get(&document_id)
            .is_some_and(|ids| !ids.is_empty());
        if let Some(mut record) = self.documents.get_mut(&document_id) {
            if has_chunks {
                record.status = IndexStatus::Indexed;
                record.error = Some(reason.to_string());
            } else {
                record.mark_failed(reason);
            }
        }
        warn!(document_id = %document_id, reason, "ingestion discarded");
    }

    /// Move a finished task to the tail and drop the oldest finished tasks
    /// past [`FINISHED_TASKS_RETAINED`].
    pub(crate) fn retire(&self, task_id: &str) {
        let mut finished = self.finished.lock().unwrap_or_else(PoisonError::into_inner);
        finished.push_back(task_id.to_string());
        while finished.len() > FINISHED_TASKS_RETAINED {
            if let Some(oldest) = finished.pop_front() {
                self.journal.remove(&oldest);
            }
        }
    }

    /// Begin and commit in one call.
    pub fn ingest(&self, record: DocumentRecord, chunks: Vec<Chunk>) -> SysdocResult<CommitSummary> {
        let task_id = self.begin_ingest(record);
        self.commit(&task_id, chunks).inspect_err(|e| {
            self.fail_ingest(&task_id, &e.to_string());
        })
    }

    // ── Removal ───────────────────────────────────────────────────────────

    /// Entity entries first, then the chunk.
    pub(crate) fn detach(&self, chunk: &Chunk) {
        self.entities.remove(chunk);
        self.chunks.remove(&chunk.chunk_id);
    }

    /// Remove one chunk and every entity entry referencing it.
    pub fn remove_chunk(&self, chunk_id: &str) -> SysdocResult<Arc<Chunk>> {
        let _gate = self.shared()?;
        let chunk = self
            .chunks
            .get(chunk_id)
            .map(|c| Arc::clone(c.value()))
            .ok_or_else(|| SysdocError::ChunkNotFound {
                chunk_id: chunk_id.to_string(),
            })?;
        if let Some(mut ids) = self.document_chunks.get_mut(&chunk.document_id) {
            ids.retain(|id| id != chunk_id);
        }
        self.detach(&chunk);
        if let Some(mut record) = self.documents.get_mut(&chunk.document_id) {
            record.chunk_count = record.chunk_count.saturating_sub(1);
        }
        Ok(chunk)
    }

    /// Remove a document, its chunks and their entity entries. Returns the
    /// number of chunks removed.
    pub fn remove_document(&self, document_id: &str) -> SysdocResult<usize> {
        let _gate = self.shared()?;
        if !self.documents.contains_key(document_id) {
            return Err(SysdocError::DocumentNotFound {
                document_id: document_id.to_string(),
            });
        }
        let ids = self
            .document_chunks
            .remove(document_id)
            .map(|(_, ids)| ids)
            .unwrap_or_default();
        for id in &ids {
            if let Some(chunk) = self.chunks.get(id).map(|c| Arc::clone(c.value())) {
                self.detach(&chunk);
            }
        }
        self.documents.remove(document_id);
        info!(document_id, chunks = ids.len(), "document removed");
        Ok(ids.len())
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn get_chunk(&self, chunk_id: &str) -> Option<Arc<Chunk>> {
        self.chunks.get(chunk_id).map(|c| Arc::clone(c.value()))
    }

    /// Chunks of a document in document order.
    pub fn chunks_of_document(&self, document_id: &str) -> Vec<Arc<Chunk>> {
        let ids = self
            .document_chunks
            .get(document_id)
            .map(|ids| ids.value().clone())
            .unwrap_or_default();
        ids.iter().filter_map(|id| self.get_chunk(id)).collect()
    }

    /// Every chunk, ordered by chunk id.
    pub fn all_chunks(&self) -> Vec<Arc<Chunk>> {
        let mut all: Vec<Arc<Chunk>> = self.chunks.iter().map(|c| Arc::clone(c.value())).collect();
        all.sort_by(|a, b| a.chunk_id.cmp(&b.chunk_id));
        all
    }

    pub fn document(&self, document_id: &str) -> Option<DocumentRecord> {
        self.documents.get(document_id).map(|r| r.value().clone())
    }

    /// Registered documents, oldest first.
    pub fn documents(&self) -> Vec<DocumentRecord> {
        let mut docs: Vec<DocumentRecord> = self.documents.iter().map(|r| r.value().clone()).collect();
        docs.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        docs
    }

    pub fn task(&self, task_id: &str) -> Option<IngestTask> {
        self.journal.get(task_id).map(|t| t.value().clone())
    }

    /// Tasks currently held by the journal, pending and finished.
    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    pub fn pending_tasks(&self) -> Vec<IngestTask> {
        self.journal
            .iter()
            .filter(|t| t.is_pending())
            .map(|t| t.value().clone())
            .collect()
    }

    pub fn entity_index(&self) -> &EntityIndex {
        &self.entities
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            documents: self.documents.len(),
            chunks: self.chunks.len(),
            entities: self.entities.len(),
            pending_tasks: self.journal.iter().filter(|t| t.is_pending()).count(),
            ..Default::default()
        };
        for record in self.documents.iter() {
            *stats
                .documents_by_type
                .entry(record.doc_type.as_str().to_string())
                .or_insert(0) += 1;
            let status = match record.status {
                IndexStatus::Pending => "pending",
                IndexStatus::Indexed => "indexed",
                IndexStatus::Failed => "failed",
            };
            *stats.documents_by_status.entry(status.to_string()).or_insert(0) += 1;
        }
        stats
    }
}

impl IChunkSource for IndexStore {
    fn pool(&self, filters: &QueryFilters) -> Vec<Arc<Chunk>> {
        let mut pool: Vec<Arc<Chunk>> = self
            .chunks
            .iter()
            .filter(|c| filters.matches(c.value()))
            .map(|c| Arc::clone(c.value()))
            .collect();
        pool.sort_by(|a, b| a.chunk_id.cmp(&b.chunk_id));
        pool
    }

    fn chunk(&self, chunk_id: &str) -> Option<Arc<Chunk>> {
        self.get_chunk(chunk_id)
    }

    fn chunks_for_entity(&self, canonical_name: &str) -> HashSet<String> {
        self.entities.lookup(canonical_name)
    }
}
