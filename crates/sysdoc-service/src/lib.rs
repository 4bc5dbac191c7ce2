//! # sysdoc-service
//!
//! The two entrypoints the surrounding service talks to, and the runtime
//! that owns them.
//!
//! - [`DocumentService`]: structure tree (or raw bytes through a parser)
//!   → chunks → entities → embeddings → atomic commit into the index.
//! - [`QueryService`]: query entrypoint returning the assembled result,
//!   plus the ask flow that hands the result to a generator.
//! - [`ConsistencyChecker`]: background maintenance of the entity index.
//! - [`SysdocRuntime`]: wires all of the above from one config.

mod answer;
mod checker;
mod ingest;
mod query;
mod runtime;

pub use answer::{build_context, confidence, Answer, NO_ANSWER};
pub use checker::ConsistencyChecker;
pub use ingest::{DocumentService, EntitySummary, IngestOptions, IngestSummary};
pub use query::QueryService;
pub use runtime::{RuntimeOptions, SysdocRuntime};
