use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only maintenance event log row: `{type, count, ts}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub event_type: String,
    pub count: i64,
    pub ts: DateTime<Utc>,
}

impl Stats {
    pub fn new(event_type: impl Into<String>, count: i64) -> Self {
        Self {
            event_type: event_type.into(),
            count,
            ts: Utc::now(),
        }
    }
}
