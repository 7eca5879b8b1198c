use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per embedding-job row. Drives retry visibility for the multi-sector
/// embed pipeline; it is not authoritative (the Memory/Vector rows are).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedLog {
    pub id: String,
    pub model: String,
    pub status: EmbedStatus,
    pub ts: DateTime<Utc>,
    pub err: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedStatus {
    Pending,
    Completed,
    Failed,
}

impl EmbedLog {
    pub fn pending(id: String, model: String) -> Self {
        Self {
            id,
            model,
            status: EmbedStatus::Pending,
            ts: Utc::now(),
            err: None,
        }
    }

    pub fn complete(&mut self) {
        self.status = EmbedStatus::Completed;
        self.ts = Utc::now();
        self.err = None;
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = EmbedStatus::Failed;
        self.ts = Utc::now();
        self.err = Some(reason.into());
    }
}
