use serde::{Deserialize, Serialize};

/// One item of a bulk `add_batch` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddBatchItem {
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// Everything the facade knows about a tenant, assembled from the `User`
/// row plus a live count of their memories — nothing storage-shaped leaks
/// through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: String,
    pub summary: Option<String>,
    pub reflection_count: u64,
    pub memory_count: usize,
}

/// A window onto the maintenance `stats` log, filtered by event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    pub event_type: Option<String>,
    pub entries: Vec<StatsEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsEntry {
    pub event_type: String,
    pub count: i64,
    pub ts: chrono::DateTime<chrono::Utc>,
}
