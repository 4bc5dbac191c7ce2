//! # sysdoc-index
//!
//! The authoritative corpus and the entity index derived from it.
//!
//! - [`EntityIndex`]: canonical name → chunk ids, sharded by `DashMap`.
//! - [`IndexStore`]: chunk store + document registry + ingestion journal.
//!   Keeps chunks and entity entries consistent in both directions.
//! - Consistency check and repair, JSON snapshots with recovery.

mod consistency;
mod entity_index;
mod journal;
mod snapshot;
mod stats;
mod store;

pub use consistency::{ConsistencyReport, RepairReport};
pub use entity_index::EntityIndex;
pub use journal::{IngestTask, TaskState};
pub use snapshot::{IndexSnapshot, RecoveryReport, SNAPSHOT_VERSION};
pub use stats::IndexStats;
pub use store::{CommitSummary, IndexStore, FINISHED_TASKS_RETAINED};
