use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::OmResult;
use crate::memory::{Memory, Salience, Sector};
use crate::models::{EmbedLog, Stats, TemporalFact, User, Waypoint};
use crate::traits::transaction::Transaction;

/// Durable store for metadata, waypoints, users, embed logs, and bitemporal
/// facts — everything except the dense vectors themselves (see
/// [`crate::traits::VectorStore`]). Every mutating operation that
/// references a tenant MUST be passed a `user_id`; the handful of
/// tenant-free operations here are reserved for maintenance and are called
/// out as such.
#[async_trait]
pub trait Store: Send + Sync {
    // --- memory CRUD -------------------------------------------------
    async fn insert_memory(&self, memory: &Memory) -> OmResult<()>;
    async fn update_memory_fields(
        &self,
        id: &str,
        user_id: Option<&str>,
        content: Option<&str>,
        tags: Option<&[String]>,
        meta: Option<&serde_json::Value>,
    ) -> OmResult<()>;
    async fn update_mean_vec(
        &self,
        id: &str,
        user_id: Option<&str>,
        mean_dim: usize,
        mean_vec: &[f32],
    ) -> OmResult<()>;
    async fn update_last_seen_and_salience(
        &self,
        id: &str,
        user_id: Option<&str>,
        last_seen_at: DateTime<Utc>,
        salience: Salience,
    ) -> OmResult<()>;
    async fn update_feedback(
        &self,
        id: &str,
        user_id: Option<&str>,
        feedback_score: f64,
    ) -> OmResult<()>;
    async fn delete_memory(&self, id: &str, user_id: Option<&str>) -> OmResult<()>;

    async fn get_memory(&self, id: &str, user_id: Option<&str>) -> OmResult<Option<Memory>>;
    async fn get_memory_by_simhash(
        &self,
        simhash: &str,
        user_id: Option<&str>,
    ) -> OmResult<Option<Memory>>;
    async fn get_memories_bulk(&self, ids: &[String], user_id: Option<&str>)
        -> OmResult<Vec<Memory>>;
    /// `None` counts across every tenant, matching `list_memories`'s
    /// unfiltered scan; `Some` scopes to one tenant.
    async fn count_memories(&self, user_id: Option<&str>) -> OmResult<usize>;

    /// Ordered by `created_at desc` when `cursor` is `None`; otherwise
    /// stable-paginated by `(created_at, id)` starting after `cursor`, for
    /// the decay maintenance scan.
    async fn list_memories(
        &self,
        user_id: Option<&str>,
        sector: Option<Sector>,
        cursor: Option<(DateTime<Utc>, String)>,
        limit: usize,
    ) -> OmResult<Vec<Memory>>;

    // --- waypoints -----------------------------------------------------
    async fn insert_waypoint(&self, waypoint: &Waypoint) -> OmResult<()>;
    async fn update_waypoint_weight(
        &self,
        src_id: &str,
        dst_id: &str,
        user_id: Option<&str>,
        weight: f64,
    ) -> OmResult<()>;
    async fn get_waypoints_by_src(
        &self,
        src_id: &str,
        user_id: Option<&str>,
    ) -> OmResult<Vec<Waypoint>>;
    async fn get_neighbors(&self, src_id: &str, user_id: Option<&str>) -> OmResult<Vec<Waypoint>>;
    async fn delete_waypoints_touching(&self, id: &str, user_id: Option<&str>) -> OmResult<()>;
    /// Maintenance-only: not tenant-scoped, deletes globally below threshold.
    async fn prune_waypoints(&self, threshold: f64) -> OmResult<usize>;

    // --- users -----------------------------------------------------------
    async fn get_user(&self, user_id: &str) -> OmResult<Option<User>>;
    async fn upsert_user(&self, user: &User) -> OmResult<()>;

    // --- embed logs --------------------------------------------------------
    async fn insert_embed_log(&self, log: &EmbedLog) -> OmResult<()>;
    async fn update_embed_log(&self, log: &EmbedLog) -> OmResult<()>;

    // --- temporal facts (optional adjacent subsystem) -----------------------
    async fn insert_temporal_fact(&self, fact: &TemporalFact) -> OmResult<()>;
    async fn close_temporal_fact(&self, id: &str, valid_to: DateTime<Utc>) -> OmResult<()>;
    async fn get_open_temporal_fact(
        &self,
        user_id: Option<&str>,
        subject: &str,
        predicate: &str,
    ) -> OmResult<Option<TemporalFact>>;

    // --- maintenance / stats -----------------------------------------------
    /// Maintenance-only: not tenant-scoped.
    async fn record_stat(&self, stat: &Stats) -> OmResult<()>;
    /// Most recent stats rows, newest first, optionally filtered by
    /// `event_type`. Used by the ops facade's `get_stats`.
    async fn list_stats(&self, event_type: Option<&str>, limit: usize) -> OmResult<Vec<Stats>>;

    // --- transactions --------------------------------------------------------
    async fn begin(&self) -> OmResult<Box<dyn Transaction>>;
}
