//! Final ordering and citations.

use std::collections::{HashMap, HashSet};

use sysdoc_core::models::{AssembledResult, Citation, ResultItem, ResultRole, RetrievalCandidate};
use sysdoc_core::traits::IChunkSource;

use crate::cross_reference::CrossReference;

/// Orders primaries and their extras into the context handed to generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler;

impl ResultAssembler {
    /// Primaries in the given order, each followed by its extras (relevance
    /// descending). A chunk appears once; a primary is never repeated as an
    /// extra. Chunks that vanished from the index since retrieval are
    /// skipped.
    pub fn assemble(
        &self,
        primaries: Vec<RetrievalCandidate>,
        extras: Vec<CrossReference>,
        source: &dyn IChunkSource,
        degraded: bool,
    ) -> AssembledResult {
        let mut extras_by_origin: HashMap<String, Vec<CrossReference>> = HashMap::new();
        for extra in extras {
            extras_by_origin
                .entry(extra.origin().to_string())
                .or_default()
                .push(extra);
        }
        for list in extras_by_origin.values_mut() {
            list.sort_by(|a, b| {
                b.relevance
                    .total_cmp(&a.relevance)
                    .then_with(|| a.candidate.chunk_id.cmp(&b.candidate.chunk_id))
            });
        }

        let primary_ids: HashSet<String> = primaries.iter().map(|p| p.chunk_id.clone()).collect();
        let mut placed: HashSet<String> = HashSet::new();
        let mut items: Vec<ResultItem> = Vec::new();

        for primary in primaries {
            if !placed.insert(primary.chunk_id.clone()) {
                continue;
            }
            let origin = primary.chunk_id.clone();
            if let Some(item) = item(primary, ResultRole::Primary, source) {
                items.push(item);
            } else {
                continue;
            }

            for extra in extras_by_origin.remove(&origin).unwrap_or_default() {
                let id = &extra.candidate.chunk_id;
                if primary_ids.contains(id) || !placed.insert(id.clone()) {
                    continue;
                }
                let role = ResultRole::CrossReference {
                    origin: origin.clone(),
                    relevance: extra.relevance,
                    shared_entities: extra.shared_entities,
                };
                if let Some(item) = item(extra.candidate, role, source) {
                    items.push(item);
                }
            }
        }

        let citations = citations(&items, source);
        AssembledResult {
            items,
            citations,
            degraded,
        }
    }
}

fn item(
    candidate: RetrievalCandidate,
    role: ResultRole,
    source: &dyn IChunkSource,
) -> Option<ResultItem> {
    let chunk = source.chunk(&candidate.chunk_id)?;
    Some(ResultItem {
        content: chunk.content.clone(),
        content_type: chunk.content_type,
        section_path: chunk.section_path.clone(),
        candidate,
        role,
    })
}

/// One citation per document, in order of first appearance. The section is
/// taken from the document's highest-ranked primary, else from its most
/// relevant extra.
fn citations(items: &[ResultItem], source: &dyn IChunkSource) -> Vec<Citation> {
    let mut order: Vec<&str> = Vec::new();
    let mut best: HashMap<&str, &ResultItem> = HashMap::new();

    for item in items {
        let doc = item.document_id();
        match best.get(doc) {
            None => {
                order.push(doc);
                best.insert(doc, item);
            }
            Some(current) if !current.is_primary() => {
                let better = match (&item.role, &current.role) {
                    (ResultRole::Primary, _) => true,
                    (
                        ResultRole::CrossReference { relevance: new, .. },
                        ResultRole::CrossReference { relevance: old, .. },
                    ) => new > old,
                    _ => false,
                };
                if better {
                    best.insert(doc, item);
                }
            }
            Some(_) => {}
        }
    }

    order
        .into_iter()
        .filter_map(|doc| {
            let item = best.get(doc)?;
            let filename = source
                .chunk(item.chunk_id())
                .map(|c| c.metadata.filename.clone())
                .unwrap_or_default();
            Some(Citation {
                document_id: doc.to_string(),
                filename,
                section_path: item.section_path.clone(),
            })
        })
        .collect()
}
