use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Config as PoolConfig, Pool, Runtime};
use openmemory_core::config::PostgresConfig;
use openmemory_core::errors::{OmError, OmResult};
use openmemory_core::memory::{Memory, Salience, Sector};
use openmemory_core::models::{EmbedLog, EmbedStatus, Stats, TemporalFact, User, Waypoint};
use openmemory_core::traits::{Store, Transaction};
use tokio_postgres::{NoTls, Row};

use super::conn::PgConn;
use super::migrations::run_migrations;
use super::transaction::PostgresTransaction;

pub struct PostgresStore {
    shared: Arc<PgConn>,
}

impl PostgresStore {
    pub async fn connect(config: &PostgresConfig) -> OmResult<Self> {
        let mut pool_config = PoolConfig::new();
        if let Some(conn_str) = &config.connection_string {
            pool_config.url = Some(conn_str.clone());
        } else {
            pool_config.host = Some(config.host.clone());
            pool_config.port = Some(config.port);
            pool_config.dbname = Some(config.db.clone());
            pool_config.user = Some(config.user.clone());
            pool_config.password = Some(config.password.clone());
        }
        pool_config.pool = Some(deadpool_postgres::PoolConfig::new(config.pool_size.max(1)));

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| OmError::Storage(e.to_string()))?;

        {
            let mut client = pool.get().await.map_err(|e| OmError::Storage(e.to_string()))?;
            run_migrations(&mut client).await?;
        }

        Ok(Self { shared: PgConn::new(pool) })
    }

    pub(crate) fn shared_conn(&self) -> Arc<PgConn> {
        self.shared.clone()
    }
}

fn vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_vec(b: &[u8]) -> Vec<f32> {
    b.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
}

fn row_to_memory(row: &Row) -> OmResult<Memory> {
    let sector_str: String = row.get("primary_sector");
    let tags_json: serde_json::Value = row.get("tags");
    let mean_vec_bytes: Option<Vec<u8>> = row.get("mean_vec");
    Ok(Memory {
        id: row.get("id"),
        user_id: row.get("user_id"),
        segment: row.get("segment"),
        content: row.get("content"),
        simhash: row.get("simhash"),
        primary_sector: sector_str.parse().unwrap_or(Sector::Semantic),
        tags: serde_json::from_value(tags_json).unwrap_or_default(),
        meta: row.get("meta"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        last_seen_at: row.get("last_seen_at"),
        salience: Salience::new(row.get("salience")),
        decay_lambda: row.get("decay_lambda"),
        version: row.get::<_, i64>("version") as u32,
        mean_dim: row.get::<_, i64>("mean_dim") as usize,
        mean_vec: mean_vec_bytes.map(|b| bytes_to_vec(&b)).unwrap_or_default(),
        compressed_vec: row.get("compressed_vec"),
        feedback_score: row.get("feedback_score"),
    })
}

#[async_trait]
impl Store for PostgresStore {
    async fn insert_memory(&self, memory: &Memory) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "INSERT INTO memories (id, user_id, segment, content, simhash, primary_sector, tags,
                    meta, created_at, updated_at, last_seen_at, salience, decay_lambda, version,
                    mean_dim, mean_vec, compressed_vec, feedback_score)
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18)
                 ON CONFLICT (id) DO UPDATE SET
                    content=excluded.content, tags=excluded.tags, meta=excluded.meta,
                    updated_at=excluded.updated_at, mean_dim=excluded.mean_dim,
                    mean_vec=excluded.mean_vec, version=memories.version + 1",
                &[
                    &memory.id,
                    &memory.user_id,
                    &memory.segment,
                    &memory.content,
                    &memory.simhash,
                    &memory.primary_sector.as_str(),
                    &serde_json::to_value(&memory.tags).unwrap_or_default(),
                    &memory.meta,
                    &memory.created_at,
                    &memory.updated_at,
                    &memory.last_seen_at,
                    &memory.salience.value(),
                    &memory.decay_lambda,
                    &(memory.version as i64),
                    &(memory.mean_dim as i64),
                    &vec_to_bytes(&memory.mean_vec),
                    &memory.compressed_vec,
                    &memory.feedback_score,
                ],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn update_memory_fields(
        &self,
        id: &str,
        user_id: Option<&str>,
        content: Option<&str>,
        tags: Option<&[String]>,
        meta: Option<&serde_json::Value>,
    ) -> OmResult<()> {
        let client = self.shared.client().await?;
        let now = Utc::now();
        client
            .execute(
                "UPDATE memories SET
                    content = COALESCE($1, content),
                    tags = COALESCE($2, tags),
                    meta = COALESCE($3, meta),
                    updated_at = $4,
                    version = version + 1
                 WHERE id = $5 AND ($6::text IS NULL OR user_id = $6)",
                &[
                    &content,
                    &tags.map(|t| serde_json::to_value(t).unwrap_or_default()),
                    &meta,
                    &now,
                    &id,
                    &user_id,
                ],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn update_mean_vec(
        &self,
        id: &str,
        user_id: Option<&str>,
        mean_dim: usize,
        mean_vec: &[f32],
    ) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "UPDATE memories SET mean_dim=$1, mean_vec=$2, updated_at=$3
                 WHERE id=$4 AND ($5::text IS NULL OR user_id=$5)",
                &[&(mean_dim as i64), &vec_to_bytes(mean_vec), &Utc::now(), &id, &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn update_last_seen_and_salience(
        &self,
        id: &str,
        user_id: Option<&str>,
        last_seen_at: DateTime<Utc>,
        salience: Salience,
    ) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "UPDATE memories SET last_seen_at=$1, salience=$2
                 WHERE id=$3 AND ($4::text IS NULL OR user_id=$4)",
                &[&last_seen_at, &salience.value(), &id, &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn update_feedback(&self, id: &str, user_id: Option<&str>, feedback_score: f64) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "UPDATE memories SET feedback_score=$1 WHERE id=$2 AND ($3::text IS NULL OR user_id=$3)",
                &[&feedback_score, &id, &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn delete_memory(&self, id: &str, user_id: Option<&str>) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "DELETE FROM memories WHERE id=$1 AND ($2::text IS NULL OR user_id=$2)",
                &[&id, &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_memory(&self, id: &str, user_id: Option<&str>) -> OmResult<Option<Memory>> {
        let client = self.shared.client().await?;
        let row = client
            .query_opt(
                "SELECT * FROM memories WHERE id=$1 AND ($2::text IS NULL OR user_id=$2)",
                &[&id, &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        row.map(|r| row_to_memory(&r)).transpose()
    }

    async fn get_memory_by_simhash(&self, simhash: &str, user_id: Option<&str>) -> OmResult<Option<Memory>> {
        let client = self.shared.client().await?;
        let row = client
            .query_opt(
                "SELECT * FROM memories WHERE simhash=$1 AND ($2::text IS NULL OR user_id=$2)
                 ORDER BY salience DESC LIMIT 1",
                &[&simhash, &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        row.map(|r| row_to_memory(&r)).transpose()
    }

    async fn get_memories_bulk(&self, ids: &[String], user_id: Option<&str>) -> OmResult<Vec<Memory>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let client = self.shared.client().await?;
        let rows = client
            .query(
                "SELECT * FROM memories WHERE id = ANY($1) AND ($2::text IS NULL OR user_id=$2)",
                &[&ids, &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        rows.iter().map(row_to_memory).collect()
    }

    async fn count_memories(&self, user_id: Option<&str>) -> OmResult<usize> {
        let client = self.shared.client().await?;
        let row = client
            .query_one(
                "SELECT COUNT(*) FROM memories WHERE ($1::text IS NULL OR user_id=$1)",
                &[&user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        let count: i64 = row.get(0);
        Ok(count as usize)
    }

    async fn list_memories(
        &self,
        user_id: Option<&str>,
        sector: Option<Sector>,
        cursor: Option<(DateTime<Utc>, String)>,
        limit: usize,
    ) -> OmResult<Vec<Memory>> {
        let client = self.shared.client().await?;
        let sector_str = sector.map(|s| s.as_str().to_string());
        let rows = match cursor {
            Some((created, id)) => client
                .query(
                    "SELECT * FROM memories
                     WHERE ($1::text IS NULL OR user_id=$1)
                       AND ($2::text IS NULL OR primary_sector=$2)
                       AND (created_at > $3 OR (created_at = $3 AND id > $4))
                     ORDER BY created_at ASC, id ASC LIMIT $5",
                    &[&user_id, &sector_str, &created, &id, &(limit as i64)],
                )
                .await,
            None => client
                .query(
                    "SELECT * FROM memories
                     WHERE ($1::text IS NULL OR user_id=$1)
                       AND ($2::text IS NULL OR primary_sector=$2)
                     ORDER BY created_at DESC LIMIT $3",
                    &[&user_id, &sector_str, &(limit as i64)],
                )
                .await,
        }
        .map_err(|e| OmError::Storage(e.to_string()))?;
        rows.iter().map(row_to_memory).collect()
    }

    async fn insert_waypoint(&self, waypoint: &Waypoint) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "INSERT INTO waypoints (src_id, dst_id, user_id, weight, created_at, updated_at)
                 VALUES ($1,$2,$3,$4,$5,$6)
                 ON CONFLICT (src_id, dst_id, user_id) DO UPDATE SET
                    weight=excluded.weight, updated_at=excluded.updated_at",
                &[
                    &waypoint.src_id,
                    &waypoint.dst_id,
                    &waypoint.user_id,
                    &waypoint.clamped_weight(),
                    &waypoint.created_at,
                    &waypoint.updated_at,
                ],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn update_waypoint_weight(
        &self,
        src_id: &str,
        dst_id: &str,
        user_id: Option<&str>,
        weight: f64,
    ) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "UPDATE waypoints SET weight=$1, updated_at=$2
                 WHERE src_id=$3 AND dst_id=$4 AND ($5::text IS NULL OR user_id=$5)",
                &[&weight.clamp(0.0, 1.0), &Utc::now(), &src_id, &dst_id, &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_waypoints_by_src(&self, src_id: &str, user_id: Option<&str>) -> OmResult<Vec<Waypoint>> {
        self.get_neighbors(src_id, user_id).await
    }

    async fn get_neighbors(&self, src_id: &str, user_id: Option<&str>) -> OmResult<Vec<Waypoint>> {
        let client = self.shared.client().await?;
        let rows = client
            .query(
                "SELECT src_id, dst_id, user_id, weight, created_at, updated_at FROM waypoints
                 WHERE src_id=$1 AND ($2::text IS NULL OR user_id=$2)",
                &[&src_id, &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(rows
            .iter()
            .map(|row| Waypoint {
                src_id: row.get(0),
                dst_id: row.get(1),
                user_id: row.get(2),
                weight: row.get(3),
                created_at: row.get(4),
                updated_at: row.get(5),
            })
            .collect())
    }

    async fn delete_waypoints_touching(&self, id: &str, user_id: Option<&str>) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "DELETE FROM waypoints WHERE (src_id=$1 OR dst_id=$1) AND ($2::text IS NULL OR user_id=$2)",
                &[&id, &user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn prune_waypoints(&self, threshold: f64) -> OmResult<usize> {
        let client = self.shared.client().await?;
        let n = client
            .execute("DELETE FROM waypoints WHERE weight < $1", &[&threshold])
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(n as usize)
    }

    async fn get_user(&self, user_id: &str) -> OmResult<Option<User>> {
        let client = self.shared.client().await?;
        let row = client
            .query_opt(
                "SELECT user_id, summary, reflection_count, created_at, updated_at FROM users WHERE user_id=$1",
                &[&user_id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(row.map(|row| User {
            user_id: row.get(0),
            summary: row.get(1),
            reflection_count: row.get::<_, i64>(2) as u64,
            created_at: row.get(3),
            updated_at: row.get(4),
        }))
    }

    async fn upsert_user(&self, user: &User) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "INSERT INTO users (user_id, summary, reflection_count, created_at, updated_at)
                 VALUES ($1,$2,$3,$4,$5)
                 ON CONFLICT (user_id) DO UPDATE SET
                    summary=excluded.summary, reflection_count=excluded.reflection_count, updated_at=excluded.updated_at",
                &[
                    &user.user_id,
                    &user.summary,
                    &(user.reflection_count as i64),
                    &user.created_at,
                    &user.updated_at,
                ],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn insert_embed_log(&self, log: &EmbedLog) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "INSERT INTO embed_logs (id, model, status, ts, err) VALUES ($1,$2,$3,$4,$5)",
                &[&log.id, &log.model, &status_str(log.status), &log.ts, &log.err],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn update_embed_log(&self, log: &EmbedLog) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "UPDATE embed_logs SET status=$1, ts=$2, err=$3 WHERE id=$4",
                &[&status_str(log.status), &log.ts, &log.err, &log.id],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn insert_temporal_fact(&self, fact: &TemporalFact) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "INSERT INTO temporal_facts (id, user_id, subject, predicate, object, valid_from, valid_to)
                 VALUES ($1,$2,$3,$4,$5,$6,$7)",
                &[
                    &fact.id,
                    &fact.user_id,
                    &fact.subject,
                    &fact.predicate,
                    &fact.object,
                    &fact.valid_from,
                    &fact.valid_to,
                ],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn close_temporal_fact(&self, id: &str, valid_to: DateTime<Utc>) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute("UPDATE temporal_facts SET valid_to=$1 WHERE id=$2", &[&valid_to, &id])
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_open_temporal_fact(
        &self,
        user_id: Option<&str>,
        subject: &str,
        predicate: &str,
    ) -> OmResult<Option<TemporalFact>> {
        let client = self.shared.client().await?;
        let row = client
            .query_opt(
                "SELECT id, user_id, subject, predicate, object, valid_from, valid_to FROM temporal_facts
                 WHERE ($1::text IS NULL OR user_id=$1) AND subject=$2 AND predicate=$3 AND valid_to IS NULL",
                &[&user_id, &subject, &predicate],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(row.map(|row| TemporalFact {
            id: row.get(0),
            user_id: row.get(1),
            subject: row.get(2),
            predicate: row.get(3),
            object: row.get(4),
            valid_from: row.get(5),
            valid_to: row.get(6),
        }))
    }

    async fn record_stat(&self, stat: &Stats) -> OmResult<()> {
        let client = self.shared.client().await?;
        client
            .execute(
                "INSERT INTO stats (event_type, count, ts) VALUES ($1,$2,$3)",
                &[&stat.event_type, &stat.count, &stat.ts],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn list_stats(&self, event_type: Option<&str>, limit: usize) -> OmResult<Vec<Stats>> {
        let client = self.shared.client().await?;
        let rows = client
            .query(
                "SELECT event_type, count, ts FROM stats
                 WHERE ($1::text IS NULL OR event_type=$1)
                 ORDER BY ts DESC LIMIT $2",
                &[&event_type, &(limit as i64)],
            )
            .await
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(rows
            .iter()
            .map(|row: &Row| Stats { event_type: row.get(0), count: row.get(1), ts: row.get(2) })
            .collect())
    }

    async fn begin(&self) -> OmResult<Box<dyn Transaction>> {
        let level = self.shared.begin().await?;
        Ok(Box::new(PostgresTransaction { shared: self.shared.clone(), level }))
    }
}

fn status_str(status: EmbedStatus) -> &'static str {
    match status {
        EmbedStatus::Pending => "pending",
        EmbedStatus::Completed => "completed",
        EmbedStatus::Failed => "failed",
    }
}
