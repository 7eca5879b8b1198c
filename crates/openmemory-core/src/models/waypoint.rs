use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A directed, weighted edge between two memories within a tenant.
/// Primary key `(src_id, dst_id, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub src_id: String,
    pub dst_id: String,
    pub user_id: Option<String>,
    pub weight: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Waypoint {
    pub fn new(src_id: String, dst_id: String, user_id: Option<String>, weight: f64) -> Self {
        let now = Utc::now();
        Self {
            src_id,
            dst_id,
            user_id,
            weight: weight.clamp(0.0, 1.0),
            created_at: now,
            updated_at: now,
        }
    }

    /// Weights outside `[0, 1]` are clamped on read.
    pub fn clamped_weight(&self) -> f64 {
        self.weight.clamp(0.0, 1.0)
    }
}
