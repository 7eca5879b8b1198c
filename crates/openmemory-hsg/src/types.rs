//! Shared request/response/event types for the HSG orchestrator (§4.6).

use chrono::{DateTime, Utc};
use openmemory_core::memory::Sector;
use serde::{Deserialize, Serialize};

/// Optional overrides on `add` — an explicit id short-circuits the
/// simhash idempotency lookup, an explicit sector bypasses the classifier.
#[derive(Debug, Clone, Default)]
pub struct AddOverrides {
    pub id: Option<String>,
    pub sector: Option<Sector>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddResult {
    pub id: String,
    pub primary_sector: Sector,
    pub sectors: Vec<Sector>,
    pub chunks: usize,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<String>,
}

/// Filters accepted by `query` (§4.6).
#[derive(Debug, Clone, Default)]
pub struct QueryFilters {
    pub sectors: Option<Vec<Sector>>,
    pub min_salience: Option<f64>,
    pub user_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
}

/// One ranked result from `query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMemory {
    pub id: String,
    pub content: String,
    pub primary_sector: Sector,
    pub tags: Vec<String>,
    pub salience: f64,
    pub score: f64,
    pub last_seen_at: DateTime<Utc>,
}

/// Fields that may change on `update`; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateFields {
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<serde_json::Value>,
}

/// Subscriber-facing lifecycle events (§4.6 step "emit memory_added").
#[derive(Debug, Clone)]
pub enum HsgEvent {
    MemoryAdded { id: String, user_id: Option<String>, primary_sector: Sector },
    MemoryUpdated { id: String, user_id: Option<String> },
    MemoryDeleted { id: String, user_id: Option<String> },
    Consolidated { id: String, user_id: Option<String> },
}
