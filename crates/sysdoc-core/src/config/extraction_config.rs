use serde::{Deserialize, Serialize};

use super::defaults;

/// Entity extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Record the collection segment of an endpoint path (`/api/users` -> `users`)
    /// as a table reference so endpoint docs link to schema docs.
    pub link_endpoint_resources: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            link_endpoint_resources: defaults::DEFAULT_LINK_ENDPOINT_RESOURCES,
        }
    }
}
