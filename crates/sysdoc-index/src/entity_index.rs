use std::collections::{HashMap, HashSet};

use dashmap::DashMap;
use sysdoc_core::models::Chunk;

/// Canonical name → ids of the chunks mentioning it.
///
/// Keys are spread over `DashMap` shards. Every mutation of one name goes
/// through its shard's write lock, so concurrent adds touching the same name
/// are serialized while different names proceed in parallel.
#[derive(Debug, Default)]
pub struct EntityIndex {
    by_name: DashMap<String, HashSet<String>>,
    /// document_id → canonical name → number of that document's chunks
    /// mentioning it.
    by_document: DashMap<String, HashMap<String, usize>>,
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every entity of `chunk`.
    pub fn add(&self, chunk: &Chunk) {
        let names = chunk.canonical_names();
        if names.is_empty() {
            return;
        }
        for name in &names {
            self.by_name
                .entry((*name).to_string())
                .or_default()
                .insert(chunk.chunk_id.clone());
        }
        let mut per_doc = self.by_document.entry(chunk.document_id.clone()).or_default();
        for name in names {
            *per_doc.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    /// Drop every entry referencing `chunk`. Names left without chunks are
    /// removed entirely.
    pub fn remove(&self, chunk: &Chunk) {
        let names = chunk.canonical_names();
        for name in &names {
            self.unlink(name, &chunk.chunk_id);
        }
        if let Some(mut per_doc) = self.by_document.get_mut(&chunk.document_id) {
            for name in &names {
                if let Some(count) = per_doc.get_mut(*name) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        per_doc.remove(*name);
                    }
                }
            }
        }
        self.by_document
            .remove_if(&chunk.document_id, |_, per_doc| per_doc.is_empty());
    }

    /// Add one (name, chunk) link. Used by repair for unindexed entities.
    pub(crate) fn link(&self, name: &str, chunk_id: &str) {
        self.by_name
            .entry(name.to_string())
            .or_default()
            .insert(chunk_id.to_string());
    }

    /// Remove one (name, chunk) link. Used by repair for dangling entries.
    pub(crate) fn unlink(&self, name: &str, chunk_id: &str) {
        if let Some(mut ids) = self.by_name.get_mut(name) {
            ids.remove(chunk_id);
        }
        self.by_name.remove_if(name, |_, ids| ids.is_empty());
    }

    /// Chunk ids mentioning `canonical_name`. Unknown names give an empty set.
    pub fn lookup(&self, canonical_name: &str) -> HashSet<String> {
        self.by_name
            .get(canonical_name)
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    /// Canonical names mentioned anywhere in a document.
    pub fn lookup_by_document(&self, document_id: &str) -> HashSet<String> {
        self.by_document
            .get(document_id)
            .map(|names| names.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, canonical_name: &str, chunk_id: &str) -> bool {
        self.by_name
            .get(canonical_name)
            .is_some_and(|ids| ids.contains(chunk_id))
    }

    /// Number of distinct canonical names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Snapshot of every (name, chunk id) link.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.by_name
            .iter()
            .flat_map(|entry| {
                let name = entry.key().clone();
                entry
                    .value()
                    .iter()
                    .map(|id| (name.clone(), id.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn clear(&self) {
        self.by_name.clear();
        self.by_document.clear();
    }

    /// Recompute the per-document view from `chunks`.
    pub(crate) fn rebuild_documents<'a>(&self, chunks: impl IntoIterator<Item = &'a Chunk>) {
        self.by_document.clear();
        for chunk in chunks {
            let mut per_doc = self.by_document.entry(chunk.document_id.clone()).or_default();
            for name in chunk.canonical_names() {
                *per_doc.entry(name.to_string()).or_insert(0) += 1;
            }
        }
        self.by_document.retain(|_, per_doc| !per_doc.is_empty());
    }
}
