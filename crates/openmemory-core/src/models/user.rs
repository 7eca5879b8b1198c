use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-tenant profile row. First-touch on memory add; `summary` and
/// `reflection_count` are mutated by the (external) reflection subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub summary: Option<String>,
    pub reflection_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(user_id: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            summary: None,
            reflection_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
