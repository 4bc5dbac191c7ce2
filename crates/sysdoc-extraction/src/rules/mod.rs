//! Extraction rules, one module per entity family.

pub(crate) mod domain;
pub(crate) mod endpoint;
pub(crate) mod table;
