//! One-hop cross-reference enrichment over shared entities.
//!
//! Every primary pulls in chunks of *other* documents that mention the same
//! canonical entities, scored by the Jaccard overlap of the two entity sets.
//! Extras are assigned globally: an extra goes to the primary it overlaps
//! most, and each primary keeps at most `max_extra_per_result` extras.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use rayon::prelude::*;
use sysdoc_core::config::CrossReferenceConfig;
use sysdoc_core::models::{Chunk, RetrievalCandidate};
use sysdoc_core::traits::IChunkSource;
use tracing::debug;

/// An extra chunk and the primary that pulled it in.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossReference {
    /// Candidate with `cross_ref_of` set to the origin primary.
    pub candidate: RetrievalCandidate,
    pub relevance: f64,
    pub shared_entities: Vec<String>,
}

impl CrossReference {
    pub fn origin(&self) -> &str {
        self.candidate.cross_ref_of.as_deref().unwrap_or_default()
    }
}

/// A scored (primary, extra) pair before assignment.
struct Link {
    primary_rank: usize,
    primary_id: String,
    extra: Arc<Chunk>,
    relevance: f64,
    shared: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CrossReferenceEnricher {
    config: CrossReferenceConfig,
}

impl CrossReferenceEnricher {
    pub fn new(config: CrossReferenceConfig) -> Self {
        Self { config }
    }

    /// Extras for the given primaries with the configured limits.
    pub fn enrich(
        &self,
        primaries: &[RetrievalCandidate],
        source: &dyn IChunkSource,
    ) -> Vec<CrossReference> {
        Self::enrich_with(
            primaries,
            source,
            self.config.max_extra_per_result,
            self.config.min_relevance,
        )
    }

    /// Extras for the given primaries, ordered by primary rank then
    /// relevance descending.
    pub fn enrich_with(
        primaries: &[RetrievalCandidate],
        source: &dyn IChunkSource,
        max_extra_per_result: usize,
        min_relevance: f64,
    ) -> Vec<CrossReference> {
        if max_extra_per_result == 0 || primaries.is_empty() {
            return Vec::new();
        }
        let primary_ids: HashSet<&str> = primaries.iter().map(|p| p.chunk_id.as_str()).collect();

        let mut links: Vec<Link> = primaries
            .par_iter()
            .enumerate()
            .flat_map_iter(|(rank, primary)| {
                links_for(rank, primary, source, &primary_ids, min_relevance)
            })
            .collect();

        links.sort_by(|a, b| {
            b.relevance
                .total_cmp(&a.relevance)
                .then_with(|| a.primary_rank.cmp(&b.primary_rank))
                .then_with(|| a.extra.chunk_id.cmp(&b.extra.chunk_id))
        });

        let mut assigned: HashSet<String> = HashSet::new();
        let mut per_primary: HashMap<usize, usize> = HashMap::new();
        let mut chosen: Vec<Link> = Vec::new();
        for link in links {
            let count = per_primary.entry(link.primary_rank).or_default();
            if *count >= max_extra_per_result || assigned.contains(&link.extra.chunk_id) {
                continue;
            }
            *count += 1;
            assigned.insert(link.extra.chunk_id.clone());
            chosen.push(link);
        }

        chosen.sort_by(|a, b| {
            a.primary_rank
                .cmp(&b.primary_rank)
                .then_with(|| b.relevance.total_cmp(&a.relevance))
                .then_with(|| a.extra.chunk_id.cmp(&b.extra.chunk_id))
        });
        debug!(extras = chosen.len(), "cross-reference enrichment");

        chosen
            .into_iter()
            .map(|link| {
                let mut candidate =
                    RetrievalCandidate::new(&link.extra.chunk_id, &link.extra.document_id);
                candidate.cross_ref_of = Some(link.primary_id);
                CrossReference {
                    candidate,
                    relevance: link.relevance,
                    shared_entities: link.shared,
                }
            })
            .collect()
    }
}

/// Qualifying extras of one primary.
fn links_for(
    rank: usize,
    primary: &RetrievalCandidate,
    source: &dyn IChunkSource,
    primary_ids: &HashSet<&str>,
    min_relevance: f64,
) -> Vec<Link> {
    let Some(chunk) = source.chunk(&primary.chunk_id) else {
        return Vec::new();
    };
    let names = chunk.canonical_names();

    let mut seen: BTreeSet<String> = BTreeSet::new();
    for name in &names {
        seen.extend(source.chunks_for_entity(name));
    }

    seen.into_iter()
        .filter(|id| !primary_ids.contains(id.as_str()))
        .filter_map(|id| source.chunk(&id))
        .filter(|extra| extra.document_id != chunk.document_id)
        .filter_map(|extra| {
            let (relevance, shared) = jaccard(&names, &extra.canonical_names());
            (relevance > 0.0 && relevance >= min_relevance).then(|| Link {
                primary_rank: rank,
                primary_id: primary.chunk_id.clone(),
                extra,
                relevance,
                shared,
            })
        })
        .collect()
}

/// Shared names over the union of both sets.
pub fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> (f64, Vec<String>) {
    let shared: Vec<String> = a.intersection(b).map(|s| s.to_string()).collect();
    let union = a.union(b).count();
    if union == 0 {
        return (0.0, shared);
    }
    (shared.len() as f64 / union as f64, shared)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jaccard_of_overlapping_sets() {
        let a: BTreeSet<&str> = ["POST /api/users", "users"].into_iter().collect();
        let b: BTreeSet<&str> = ["users", "users.email"].into_iter().collect();
        let (score, shared) = jaccard(&a, &b);
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(shared, vec!["users".to_string()]);
    }

    #[test]
    fn jaccard_of_empty_sets_is_zero() {
        let empty = BTreeSet::new();
        assert_eq!(jaccard(&empty, &empty).0, 0.0);
    }
}
