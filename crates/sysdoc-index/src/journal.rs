use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of one ingestion task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Started, nothing committed yet.
    Pending,
    Committed,
    /// Failed or abandoned. Never leaves state behind.
    Discarded,
}

/// Journal record of a per-document ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestTask {
    pub task_id: String,
    pub document_id: String,
    pub state: TaskState,
    /// Ids of the chunks committed by this task.
    #[serde(default)]
    pub chunk_ids: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl IngestTask {
    pub fn begin(document_id: impl Into<String>) -> Self {
        Self {
            task_id: uuid::Uuid::new_v4().to_string(),
            document_id: document_id.into(),
            state: TaskState::Pending,
            chunk_ids: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            error: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == TaskState::Pending
    }

    pub(crate) fn commit(&mut self, chunk_ids: Vec<String>) {
        self.state = TaskState::Committed;
        self.chunk_ids = chunk_ids;
        self.finished_at = Some(Utc::now());
    }

    pub(crate) fn discard(&mut self, reason: impl Into<String>) {
        self.state = TaskState::Discarded;
        self.error = Some(reason.into());
        self.finished_at = Some(Utc::now());
    }
}
