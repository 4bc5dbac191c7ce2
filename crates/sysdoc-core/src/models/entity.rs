use serde::{Deserialize, Serialize};

/// Category of a technical entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    ApiEndpoint,
    TableName,
    Column,
    DomainEntity,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::ApiEndpoint => "api_endpoint",
            EntityKind::TableName => "table_name",
            EntityKind::Column => "column",
            EntityKind::DomainEntity => "domain_entity",
        }
    }
}

/// A technical entity mentioned in a chunk.
///
/// `canonical_name` is the cross-document identity; `raw_mention` is only
/// kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_kind: EntityKind,
    pub canonical_name: String,
    pub raw_mention: String,
}

impl EntityRef {
    pub fn new(
        entity_kind: EntityKind,
        canonical_name: impl Into<String>,
        raw_mention: impl Into<String>,
    ) -> Self {
        Self {
            entity_kind,
            canonical_name: canonical_name.into(),
            raw_mention: raw_mention.into(),
        }
    }
}
