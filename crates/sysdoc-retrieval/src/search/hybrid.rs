//! HybridRetriever: dense + sparse candidate generation merged into one list.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use sysdoc_core::config::RetrievalConfig;
use sysdoc_core::errors::{RetrievalError, SysdocResult};
use sysdoc_core::models::{Chunk, QueryFilters, RetrievalCandidate};
use sysdoc_core::traits::IChunkSource;
use tracing::debug;

use super::{dense_channel, min_max, Bm25, Hit};

/// Merged scores closer than this count as a tie.
const TIE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct HybridRetriever {
    config: RetrievalConfig,
}

impl HybridRetriever {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Ranked candidates for a query.
    ///
    /// Filters shrink the pool before any scoring. Each channel contributes
    /// up to `top_k * fan_out` hits; the merged list is cut to `top_k`.
    /// Without a query vector only the sparse channel runs.
    pub fn retrieve(
        &self,
        source: &dyn IChunkSource,
        query_text: &str,
        query_vector: Option<&[f32]>,
        filters: &QueryFilters,
        top_k: usize,
    ) -> SysdocResult<Vec<RetrievalCandidate>> {
        if top_k == 0 {
            return Err(RetrievalError::InvalidQuery {
                reason: "top_k must be at least 1".to_string(),
            }
            .into());
        }

        let pool = source.pool(filters);
        if pool.is_empty() {
            return Err(RetrievalError::EmptyIndex.into());
        }

        let limit = top_k.saturating_mul(self.config.fan_out.max(1));
        let (dense, sparse) = rayon::join(
            || {
                query_vector
                    .map(|qv| top_hits(dense_channel(&pool, qv), &pool, limit))
                    .unwrap_or_default()
            },
            || top_hits(self.sparse_channel(&pool, query_text), &pool, limit),
        );

        debug!(
            pool = pool.len(),
            dense = dense.len(),
            sparse = sparse.len(),
            "channel hits"
        );

        let merged = self.merge(&pool, &dense, &sparse);
        let mut ranked = order_with_diversity(merged);
        ranked.truncate(top_k);
        Ok(ranked)
    }

    /// BM25 hits with a positive score.
    fn sparse_channel(&self, pool: &[Arc<Chunk>], query_text: &str) -> Vec<Hit> {
        let texts: Vec<&str> = pool.iter().map(|c| c.content.as_str()).collect();
        Bm25::new(self.config.bm25_k1, self.config.bm25_b)
            .score_all(query_text, &texts)
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > 0.0)
            .collect()
    }

    fn merge(&self, pool: &[Arc<Chunk>], dense: &[Hit], sparse: &[Hit]) -> Vec<RetrievalCandidate> {
        let mut by_index: BTreeMap<usize, RetrievalCandidate> = BTreeMap::new();

        let dense_norm = min_max(&dense.iter().map(|(_, s)| *s).collect::<Vec<_>>());
        for ((i, raw), norm) in dense.iter().zip(dense_norm) {
            let c = by_index
                .entry(*i)
                .or_insert_with(|| RetrievalCandidate::new(&pool[*i].chunk_id, &pool[*i].document_id));
            c.dense_score = Some(*raw);
            c.merged_score += self.config.dense_weight * norm;
        }

        let sparse_norm = min_max(&sparse.iter().map(|(_, s)| *s).collect::<Vec<_>>());
        for ((i, raw), norm) in sparse.iter().zip(sparse_norm) {
            let c = by_index
                .entry(*i)
                .or_insert_with(|| RetrievalCandidate::new(&pool[*i].chunk_id, &pool[*i].document_id));
            c.sparse_score = Some(*raw);
            c.merged_score += self.config.sparse_weight * norm;
        }

        by_index.into_values().collect()
    }
}

/// Best `limit` hits, score descending then chunk id ascending.
fn top_hits(mut hits: Vec<Hit>, pool: &[Arc<Chunk>], limit: usize) -> Vec<Hit> {
    hits.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then_with(|| pool[a.0].chunk_id.cmp(&pool[b.0].chunk_id))
    });
    hits.truncate(limit);
    hits
}

/// Order by merged score. Within a tie, a candidate from a document not yet
/// in the output goes first, then lower chunk id.
pub(crate) fn order_with_diversity(mut candidates: Vec<RetrievalCandidate>) -> Vec<RetrievalCandidate> {
    candidates.sort_by(|a, b| {
        b.merged_score
            .total_cmp(&a.merged_score)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });

    let mut out: Vec<RetrievalCandidate> = Vec::with_capacity(candidates.len());
    let mut seen_documents: HashSet<String> = HashSet::new();
    let mut rest = candidates.into_iter().peekable();

    while let Some(head) = rest.next() {
        let mut group = vec![head];
        while let Some(next) = rest.next_if(|c| (group[0].merged_score - c.merged_score).abs() <= TIE_EPSILON) {
            group.push(next);
        }
        while !group.is_empty() {
            let pick = group
                .iter()
                .position(|c| !seen_documents.contains(&c.document_id))
                .unwrap_or(0);
            let chosen = group.remove(pick);
            seen_documents.insert(chosen.document_id.clone());
            out.push(chosen);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(chunk: &str, doc: &str, merged: f64) -> RetrievalCandidate {
        let mut c = RetrievalCandidate::new(chunk, doc);
        c.merged_score = merged;
        c
    }

    fn ids(cands: &[RetrievalCandidate]) -> Vec<&str> {
        cands.iter().map(|c| c.chunk_id.as_str()).collect()
    }

    #[test]
    fn higher_merged_score_first() {
        let out = order_with_diversity(vec![cand("a", "d1", 0.2), cand("b", "d1", 0.9)]);
        assert_eq!(ids(&out), vec!["b", "a"]);
    }

    #[test]
    fn ties_prefer_unseen_documents() {
        let out = order_with_diversity(vec![
            cand("a1", "d1", 1.0),
            cand("a2", "d1", 0.5),
            cand("b1", "d2", 0.5),
        ]);
        assert_eq!(ids(&out), vec!["a1", "b1", "a2"]);
    }

    #[test]
    fn ties_within_seen_documents_fall_back_to_chunk_id() {
        let out = order_with_diversity(vec![
            cand("c", "d1", 0.5),
            cand("b", "d1", 0.5),
            cand("a", "d1", 0.5),
        ]);
        assert_eq!(ids(&out), vec!["a", "b", "c"]);
    }
}
