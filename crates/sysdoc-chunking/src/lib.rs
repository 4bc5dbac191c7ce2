//! # sysdoc-chunking
//!
//! Splits a [`StructureTree`](sysdoc_core::StructureTree) into retrievable
//! [`Chunk`](sysdoc_core::Chunk)s.
//!
//! Two modes:
//! - **structure_aware**: consecutive leaves under the same section are
//!   accumulated into one chunk until the size cap would be exceeded.
//! - **fixed_size**: every leaf is cut independently into windows.
//!
//! Tables and code blocks are atomic in both modes: each becomes exactly one
//! chunk regardless of size.

mod chunker;
mod leaves;
mod splitter;

pub use chunker::{chunk, Chunker};
pub use splitter::split_text;
