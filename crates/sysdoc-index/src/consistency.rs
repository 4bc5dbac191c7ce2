//! Bidirectional consistency between the chunk store and the entity index.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sysdoc_core::errors::{IndexError, SysdocResult};
use tracing::{debug, info, warn};

use crate::store::IndexStore;

/// Violations found by a consistency pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// (canonical name, chunk id) entries whose chunk is gone or no longer
    /// carries that entity.
    pub dangling_entries: Vec<(String, String)>,
    /// (canonical name, chunk id) pairs present on a chunk but not indexed.
    pub unindexed_entities: Vec<(String, String)>,
    /// (document id, chunk id) listings pointing at missing chunks.
    pub stale_listings: Vec<(String, String)>,
    /// Stored chunks missing from their document's listing.
    pub unlisted_chunks: Vec<String>,
    pub checked_chunks: usize,
    pub checked_entries: usize,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.dangling_entries.is_empty()
            && self.unindexed_entities.is_empty()
            && self.stale_listings.is_empty()
            && self.unlisted_chunks.is_empty()
    }

    pub fn violation_count(&self) -> usize {
        self.dangling_entries.len()
            + self.unindexed_entities.len()
            + self.stale_listings.len()
            + self.unlisted_chunks.len()
    }

    /// The report as an `InconsistentIndex` error, if anything is wrong.
    pub fn to_error(&self) -> Option<IndexError> {
        if self.is_consistent() {
            return None;
        }
        Some(IndexError::InconsistentIndex {
            details: format!(
                "{} dangling entries, {} unindexed entities, {} stale listings, {} unlisted chunks",
                self.dangling_entries.len(),
                self.unindexed_entities.len(),
                self.stale_listings.len(),
                self.unlisted_chunks.len()
            ),
        })
    }
}

/// What a repair pass changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairReport {
    pub removed_entries: usize,
    pub restored_entries: usize,
    pub fixed_listings: usize,
}

impl IndexStore {
    /// Full consistency pass under the exclusive gate.
    pub fn check_consistency(&self) -> SysdocResult<ConsistencyReport> {
        let _gate = self.exclusive()?;
        Ok(self.inspect())
    }

    /// Fail with `InconsistentIndex` when any violation exists.
    pub fn verify(&self) -> SysdocResult<()> {
        match self.check_consistency()?.to_error() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Rebuild the affected entries from the authoritative chunks.
    pub fn repair(&self) -> SysdocResult<RepairReport> {
        let _gate = self.exclusive()?;
        let report = self.inspect();
        Ok(self.apply_repair(&report))
    }

    /// One background maintenance turn: check, and repair when needed.
    ///
    /// Waits at most `grace` for in-flight mutations. Returns `None` when
    /// the turn was skipped.
    pub fn maintain(&self, grace: Duration) -> SysdocResult<Option<ConsistencyReport>> {
        let Some(_gate) = self.exclusive_within(grace)? else {
            debug!(grace_ms = grace.as_millis() as u64, "consistency check skipped, writers busy");
            return Ok(None);
        };
        let report = self.inspect();
        if let Some(err) = report.to_error() {
            warn!(error = %err, "inconsistent index detected, repairing");
            self.apply_repair(&report);
        }
        Ok(Some(report))
    }

    fn inspect(&self) -> ConsistencyReport {
        let mut report = ConsistencyReport::default();

        for (name, chunk_id) in self.entities.entries() {
            report.checked_entries += 1;
            let backed = self
                .chunks
                .get(&chunk_id)
                .is_some_and(|chunk| chunk.has_entity(&name));
            if !backed {
                report.dangling_entries.push((name, chunk_id));
            }
        }

        for chunk in self.all_chunks() {
            report.checked_chunks += 1;
            for name in chunk.canonical_names() {
                if !self.entities.contains(name, &chunk.chunk_id) {
                    report
                        .unindexed_entities
                        .push((name.to_string(), chunk.chunk_id.clone()));
                }
            }
            let listed = self
                .document_chunks
                .get(&chunk.document_id)
                .is_some_and(|ids| ids.contains(&chunk.chunk_id));
            if !listed {
                report.unlisted_chunks.push(chunk.chunk_id.clone());
            }
        }

        for listing in self.document_chunks.iter() {
            for chunk_id in listing.value() {
                if !self.chunks.contains_key(chunk_id) {
                    report
                        .stale_listings
                        .push((listing.key().clone(), chunk_id.clone()));
                }
            }
        }

        report.dangling_entries.sort();
        report.unindexed_entities.sort();
        report.stale_listings.sort();
        report.unlisted_chunks.sort();
        report
    }

    fn apply_repair(&self, report: &ConsistencyReport) -> RepairReport {
        let mut repair = RepairReport::default();

        for (name, chunk_id) in &report.dangling_entries {
            self.entities.unlink(name, chunk_id);
            repair.removed_entries += 1;
        }
        for (name, chunk_id) in &report.unindexed_entities {
            self.entities.link(name, chunk_id);
            repair.restored_entries += 1;
        }
        for (document_id, chunk_id) in &report.stale_listings {
            if let Some(mut ids) = self.document_chunks.get_mut(document_id) {
                ids.retain(|id| id != chunk_id);
                repair.fixed_listings += 1;
            }
        }
        for chunk_id in &report.unlisted_chunks {
            let Some(chunk) = self.get_chunk(chunk_id) else {
                continue;
            };
            self.document_chunks
                .entry(chunk.document_id.clone())
                .or_default()
                .push(chunk.chunk_id.clone());
            repair.fixed_listings += 1;
        }
        self.document_chunks.retain(|_, ids| !ids.is_empty());

        let chunks = self.all_chunks();
        self.entities
            .rebuild_documents(chunks.iter().map(|c| c.as_ref()));

        info!(
            removed = repair.removed_entries,
            restored = repair.restored_entries,
            listings = repair.fixed_listings,
            "index repaired"
        );
        repair
    }
}
