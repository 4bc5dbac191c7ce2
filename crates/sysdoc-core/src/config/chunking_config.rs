use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ChunkingError;

/// How a structure tree is cut into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Accumulate consecutive leaves of one section up to the size cap.
    StructureAware,
    /// Cut every leaf independently into windows of the size cap.
    FixedSize,
}

/// Chunking policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingPolicy {
    /// Hard cap on chunk body length, in chars. Tables and code blocks are exempt.
    pub max_chunk_chars: usize,
    /// Chars repeated from the tail of the previous chunk of the same section.
    pub overlap_chars: usize,
    pub split_mode: SplitMode,
}

impl Default for ChunkingPolicy {
    fn default() -> Self {
        Self {
            max_chunk_chars: defaults::DEFAULT_MAX_CHUNK_CHARS,
            overlap_chars: defaults::DEFAULT_OVERLAP_CHARS,
            split_mode: SplitMode::StructureAware,
        }
    }
}

impl ChunkingPolicy {
    pub fn new(max_chunk_chars: usize) -> Self {
        Self {
            max_chunk_chars,
            ..Default::default()
        }
    }

    pub fn with_overlap(mut self, overlap_chars: usize) -> Self {
        self.overlap_chars = overlap_chars;
        self
    }

    pub fn with_split_mode(mut self, split_mode: SplitMode) -> Self {
        self.split_mode = split_mode;
        self
    }

    /// Reject policies that cannot produce chunks.
    pub fn validate(&self) -> Result<(), ChunkingError> {
        if self.max_chunk_chars == 0 {
            return Err(ChunkingError::InvalidPolicy {
                reason: "max_chunk_chars must be greater than 0".to_string(),
            });
        }
        if self.overlap_chars >= self.max_chunk_chars {
            return Err(ChunkingError::InvalidPolicy {
                reason: format!(
                    "overlap_chars ({}) must be smaller than max_chunk_chars ({})",
                    self.overlap_chars, self.max_chunk_chars
                ),
            });
        }
        Ok(())
    }
}
