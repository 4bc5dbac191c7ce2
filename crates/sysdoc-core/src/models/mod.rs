mod candidate;
mod chunk;
mod degradation_event;
mod document;
mod entity;
mod filters;
mod generation;
mod result;
mod structure;

pub use candidate::RetrievalCandidate;
pub use chunk::{Chunk, ChunkMetadata, ContentType, DocType};
pub use degradation_event::DegradationEvent;
pub use document::{DocumentRecord, IndexStatus};
pub use entity::{EntityKind, EntityRef};
pub use filters::QueryFilters;
pub use generation::{GenerationRequest, ResponseMode};
pub use result::{AssembledResult, Citation, ResultItem, ResultRole};
pub use structure::{NodeKind, StructureNode, StructureTree};
