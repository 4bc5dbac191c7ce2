use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chunk::DocType;

/// Lifecycle of an ingested document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    Pending,
    Indexed,
    Failed,
}

/// Registry entry for one ingested document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub document_id: String,
    pub filename: String,
    pub doc_type: DocType,
    pub tags: Vec<String>,
    pub status: IndexStatus,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
    pub indexed_at: Option<DateTime<Utc>>,
    /// Failure reason when `status` is `Failed`.
    pub error: Option<String>,
}

impl DocumentRecord {
    pub fn pending(
        document_id: impl Into<String>,
        filename: impl Into<String>,
        doc_type: DocType,
        tags: Vec<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            filename: filename.into(),
            doc_type,
            tags,
            status: IndexStatus::Pending,
            chunk_count: 0,
            created_at: Utc::now(),
            indexed_at: None,
            error: None,
        }
    }

    pub fn mark_indexed(&mut self, chunk_count: usize) {
        self.status = IndexStatus::Indexed;
        self.chunk_count = chunk_count;
        self.indexed_at = Some(Utc::now());
        self.error = None;
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = IndexStatus::Failed;
        self.chunk_count = 0;
        self.indexed_at = None;
        self.error = Some(reason.into());
    }
}
