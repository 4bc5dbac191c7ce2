use serde::{Deserialize, Serialize};

use super::defaults;

/// Index maintenance configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Interval of the background consistency checker (seconds).
    pub consistency_check_interval_secs: u64,
    /// Longest a maintenance pass waits for in-flight writes before it skips
    /// its turn (milliseconds). Queries are never blocked by maintenance.
    pub write_grace_ms: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            consistency_check_interval_secs: defaults::DEFAULT_CONSISTENCY_CHECK_INTERVAL_SECS,
            write_grace_ms: defaults::DEFAULT_WRITE_GRACE_MS,
        }
    }
}
