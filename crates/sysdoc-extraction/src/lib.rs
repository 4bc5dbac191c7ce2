//! # sysdoc-extraction
//!
//! Finds technical entities in chunks and gives each a canonical name, the
//! identity used to link chunks across documents.
//!
//! - [`EntityExtractor`]: dispatches on a chunk's content type to the
//!   endpoint, table/column and domain-entity rules.
//! - [`normalize`]: the canonical-name rules. Deterministic and total.
//! - [`detect_doc_type`]: keyword scoring used when ingestion gets no type.

mod doc_type;
mod extractor;
pub mod normalize;
mod patterns;
mod rules;

pub use doc_type::detect_doc_type;
pub use extractor::{extract, EntityExtractor};
