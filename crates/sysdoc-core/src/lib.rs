//! # sysdoc-core
//!
//! Foundation crate for the sysdoc document indexing and retrieval pipeline.
//! Defines the structure-tree and chunk data model, errors, config, constants,
//! and the traits for external collaborators (parser, embedder, cross-encoder,
//! generator). Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::SysdocConfig;
pub use errors::{SysdocError, SysdocResult};
pub use models::{
    Chunk, ContentType, DocType, EntityKind, EntityRef, NodeKind, QueryFilters,
    RetrievalCandidate, StructureNode, StructureTree,
};
