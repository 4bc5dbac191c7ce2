use std::collections::BTreeSet;

use chrono::Utc;
use sysdoc_core::config::{ChunkingPolicy, SplitMode};
use sysdoc_core::constants::LEAF_SEPARATOR;
use sysdoc_core::errors::ChunkingError;
use sysdoc_core::models::{Chunk, ChunkMetadata, ContentType, StructureTree};
use tracing::debug;

use crate::leaves::{flatten, Leaf};
use crate::splitter::split_text;

/// Chunk a tree with default metadata.
///
/// Fails with [`ChunkingError::InvalidPolicy`] when the size cap is zero or
/// the overlap does not fit inside it.
pub fn chunk(tree: &StructureTree, policy: &ChunkingPolicy) -> Result<Vec<Chunk>, ChunkingError> {
    Ok(Chunker::new(policy.clone())?.chunk(tree, &ChunkMetadata::default()))
}

/// A chunk body before ids and overlap are assigned.
#[derive(Debug)]
struct Piece {
    body: String,
    chars: usize,
    content_type: ContentType,
    section_path: Vec<String>,
}

impl Piece {
    fn new(text: &str, content_type: ContentType, path: &[String]) -> Self {
        Self {
            body: text.to_string(),
            chars: text.chars().count(),
            content_type,
            section_path: path.to_vec(),
        }
    }
}

/// Stateless chunker bound to a validated policy.
#[derive(Debug, Clone)]
pub struct Chunker {
    policy: ChunkingPolicy,
}

impl Chunker {
    pub fn new(policy: ChunkingPolicy) -> Result<Self, ChunkingError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &ChunkingPolicy {
        &self.policy
    }

    /// Cut `tree` into chunks carrying `metadata`. Deterministic: the same
    /// tree and policy always give the same chunk ids and bodies.
    pub fn chunk(&self, tree: &StructureTree, metadata: &ChunkMetadata) -> Vec<Chunk> {
        let leaves = flatten(tree);
        let pieces = match self.policy.split_mode {
            SplitMode::StructureAware => self.accumulate(&leaves),
            SplitMode::FixedSize => self.fixed_windows(&leaves),
        };

        let created_at = Utc::now();
        let mut chunks: Vec<Chunk> = Vec::with_capacity(pieces.len());
        for (ordinal, piece) in pieces.iter().enumerate() {
            let prefix = match ordinal.checked_sub(1).map(|i| &pieces[i]) {
                Some(prev) if self.shares_overlap(prev, piece) => {
                    tail_chars(&prev.body, self.policy.overlap_chars)
                }
                _ => "",
            };
            chunks.push(Chunk {
                chunk_id: Chunk::compute_id(&tree.document_id, ordinal, &piece.body),
                document_id: tree.document_id.clone(),
                content: format!("{prefix}{}", piece.body),
                content_type: piece.content_type,
                section_path: piece.section_path.clone(),
                entities: BTreeSet::new(),
                dense_vector: None,
                overlap_chars: prefix.chars().count(),
                metadata: metadata.clone(),
                created_at,
            });
        }

        debug!(
            document_id = %tree.document_id,
            leaves = leaves.len(),
            chunks = chunks.len(),
            mode = ?self.policy.split_mode,
            "document chunked"
        );
        chunks
    }

    fn shares_overlap(&self, prev: &Piece, next: &Piece) -> bool {
        self.policy.overlap_chars > 0
            && prev.content_type == ContentType::Text
            && next.content_type == ContentType::Text
            && prev.section_path == next.section_path
    }

    /// Structure-aware mode: consecutive text leaves of one section share a
    /// chunk while the cap allows. An oversized leaf is windowed and its last
    /// window stays open for the leaves that follow.
    fn accumulate(&self, leaves: &[Leaf<'_>]) -> Vec<Piece> {
        let max = self.policy.max_chunk_chars;
        let separator_chars = LEAF_SEPARATOR.chars().count();
        let mut pieces = Vec::new();
        let mut open: Option<Piece> = None;

        for leaf in leaves {
            if leaf.kind.is_atomic() {
                pieces.extend(open.take());
                pieces.push(Piece::new(leaf.text, leaf.kind.into(), leaf.path));
                continue;
            }

            let leaf_chars = leaf.text.chars().count();
            if let Some(current) = open.as_mut() {
                if current.section_path == leaf.path
                    && current.chars + separator_chars + leaf_chars <= max
                {
                    current.body.push_str(LEAF_SEPARATOR);
                    current.body.push_str(leaf.text);
                    current.chars += separator_chars + leaf_chars;
                    continue;
                }
                pieces.extend(open.take());
            }

            let mut windows = split_text(leaf.text, max);
            let last = windows.pop();
            pieces.extend(
                windows
                    .into_iter()
                    .map(|w| Piece::new(w, ContentType::Text, leaf.path)),
            );
            open = last.map(|w| Piece::new(w, ContentType::Text, leaf.path));
        }
        pieces.extend(open);
        pieces
    }

    /// Fixed-size mode: every leaf is windowed on its own.
    fn fixed_windows(&self, leaves: &[Leaf<'_>]) -> Vec<Piece> {
        let mut pieces = Vec::new();
        for leaf in leaves {
            if leaf.kind.is_atomic() {
                pieces.push(Piece::new(leaf.text, leaf.kind.into(), leaf.path));
                continue;
            }
            pieces.extend(
                split_text(leaf.text, self.policy.max_chunk_chars)
                    .into_iter()
                    .map(|w| Piece::new(w, ContentType::Text, leaf.path)),
            );
        }
        pieces
    }
}

/// The last `n` chars of `text`.
fn tail_chars(text: &str, n: usize) -> &str {
    let total = text.chars().count();
    if n >= total {
        return text;
    }
    match text.char_indices().nth(total - n) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}
