use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use openmemory_core::config::SqliteConfig;
use openmemory_core::errors::{OmError, OmResult};
use openmemory_core::memory::{Memory, Salience, Sector};
use openmemory_core::models::{EmbedLog, EmbedStatus, Stats, TemporalFact, User, Waypoint};
use openmemory_core::traits::{Store, Transaction};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::conn::SqliteConn;
use super::migrations::run_migrations;
use super::pragmas::apply_pragmas;
use super::transaction::SqliteTransaction;

/// `Store` backed by a single SQLite connection. Matches the default
/// `metadata_backend` in `StorageConfig`. Reads and writes share one
/// connection (SQLite serializes writers anyway); concurrent callers
/// queue on the internal async mutex rather than fighting over file locks.
pub struct SqliteStore {
    shared: Arc<SqliteConn>,
}

impl SqliteStore {
    pub fn open(path: &Path, config: &SqliteConfig) -> OmResult<Self> {
        let conn = Connection::open(path).map_err(|e| OmError::Storage(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        run_migrations(&conn)?;
        Ok(Self { shared: SqliteConn::new(conn) })
    }

    pub fn open_in_memory() -> OmResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| OmError::Storage(e.to_string()))?;
        run_migrations(&conn)?;
        Ok(Self { shared: SqliteConn::new(conn) })
    }

    /// Shared connection handle, used to construct a [`super::vector_store::SqliteVectorStore`]
    /// over the same connection (so both traits see one ambient transaction).
    pub(crate) fn shared_conn(&self) -> Arc<SqliteConn> {
        self.shared.clone()
    }
}

fn to_rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

fn parse_ts(s: &str) -> OmResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| OmError::Storage(format!("bad timestamp {s}: {e}")))
}

fn vec_to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn blob_to_vec(b: &[u8]) -> Vec<f32> {
    b.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
}

fn tenant_clause(user_id: Option<&str>) -> (&'static str, String) {
    match user_id {
        Some(u) => ("user_id = ?", u.to_string()),
        None => ("user_id IS NULL", String::new()),
    }
}

fn row_to_memory(row: &Row) -> rusqlite::Result<Memory> {
    let tags_json: String = row.get("tags")?;
    let meta_json: String = row.get("meta")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let last_seen_at: String = row.get("last_seen_at")?;
    let mean_vec_blob: Vec<u8> = row.get("mean_vec")?;
    let sector_str: String = row.get("primary_sector")?;

    Ok(Memory {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        segment: row.get("segment")?,
        content: row.get("content")?,
        simhash: row.get("simhash")?,
        primary_sector: sector_str.parse().unwrap_or(Sector::Semantic),
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        meta: serde_json::from_str(&meta_json).unwrap_or(serde_json::json!({})),
        created_at: created_at.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc.timestamp_opt(0, 0).unwrap()),
        updated_at: updated_at.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc.timestamp_opt(0, 0).unwrap()),
        last_seen_at: last_seen_at.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc.timestamp_opt(0, 0).unwrap()),
        salience: Salience::new(row.get("salience")?),
        decay_lambda: row.get("decay_lambda")?,
        version: row.get::<_, i64>("version")? as u32,
        mean_dim: row.get::<_, i64>("mean_dim")? as usize,
        mean_vec: blob_to_vec(&mean_vec_blob),
        compressed_vec: row.get("compressed_vec")?,
        feedback_score: row.get("feedback_score")?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_memory(&self, memory: &Memory) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        conn.execute(
            "INSERT INTO memories (id, user_id, segment, content, simhash, primary_sector, tags,
                meta, created_at, updated_at, last_seen_at, salience, decay_lambda, version,
                mean_dim, mean_vec, compressed_vec, feedback_score)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)
             ON CONFLICT(id) DO UPDATE SET
                content=excluded.content, tags=excluded.tags, meta=excluded.meta,
                updated_at=excluded.updated_at, mean_dim=excluded.mean_dim,
                mean_vec=excluded.mean_vec, version=memories.version + 1",
            params![
                memory.id,
                memory.user_id,
                memory.segment,
                memory.content,
                memory.simhash,
                memory.primary_sector.as_str(),
                serde_json::to_string(&memory.tags).unwrap_or_default(),
                memory.meta.to_string(),
                to_rfc3339(memory.created_at),
                to_rfc3339(memory.updated_at),
                to_rfc3339(memory.last_seen_at),
                memory.salience.value(),
                memory.decay_lambda,
                memory.version,
                memory.mean_dim as i64,
                vec_to_blob(&memory.mean_vec),
                memory.compressed_vec,
                memory.feedback_score,
            ],
        )
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
        let (clause, bound) = tenant_clause(user_id);
        let conn = self.shared.conn.lock().await;
        let mut sets = vec!["updated_at = ?1".to_string(), "version = version + 1".to_string()];
        let now = to_rfc3339(Utc::now());
        let mut sql_params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(now)];
        let mut idx = 2;
        if let Some(c) = content {
            sets.push(format!("content = ?{idx}"));
            sql_params.push(Box::new(c.to_string()));
            idx += 1;
        }
        if let Some(t) = tags {
            sets.push(format!("tags = ?{idx}"));
            sql_params.push(Box::new(serde_json::to_string(t).unwrap_or_default()));
            idx += 1;
        }
        if let Some(m) = meta {
            sets.push(format!("meta = ?{idx}"));
            sql_params.push(Box::new(m.to_string()));
            idx += 1;
        }
        sql_params.push(Box::new(id.to_string()));
        let id_idx = idx;
        idx += 1;
        let tenant_idx = idx;
        if user_id.is_some() {
            sql_params.push(Box::new(bound));
        }
        let sql = format!(
            "UPDATE memories SET {} WHERE id = ?{id_idx}{}",
            sets.join(", "),
            if user_id.is_some() { format!(" AND user_id = ?{tenant_idx}") } else { " AND user_id IS NULL".to_string() }
        );
        let _ = clause;
        let refs: Vec<&dyn rusqlite::ToSql> = sql_params.iter().map(|b| b.as_ref()).collect();
        conn.execute(&sql, refs.as_slice()).map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn update_mean_vec(
        &self,
        id: &str,
        user_id: Option<&str>,
        mean_dim: usize,
        mean_vec: &[f32],
    ) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "UPDATE memories SET mean_dim=?1, mean_vec=?2, updated_at=?3 WHERE id=?4 AND user_id=?5",
            None => "UPDATE memories SET mean_dim=?1, mean_vec=?2, updated_at=?3 WHERE id=?4 AND user_id IS NULL",
        };
        let now = to_rfc3339(Utc::now());
        match user_id {
            Some(u) => conn.execute(sql, params![mean_dim as i64, vec_to_blob(mean_vec), now, id, u]),
            None => conn.execute(sql, params![mean_dim as i64, vec_to_blob(mean_vec), now, id]),
        }
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
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "UPDATE memories SET last_seen_at=?1, salience=?2 WHERE id=?3 AND user_id=?4",
            None => "UPDATE memories SET last_seen_at=?1, salience=?2 WHERE id=?3 AND user_id IS NULL",
        };
        match user_id {
            Some(u) => conn.execute(sql, params![to_rfc3339(last_seen_at), salience.value(), id, u]),
            None => conn.execute(sql, params![to_rfc3339(last_seen_at), salience.value(), id]),
        }
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn update_feedback(&self, id: &str, user_id: Option<&str>, feedback_score: f64) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "UPDATE memories SET feedback_score=?1 WHERE id=?2 AND user_id=?3",
            None => "UPDATE memories SET feedback_score=?1 WHERE id=?2 AND user_id IS NULL",
        };
        match user_id {
            Some(u) => conn.execute(sql, params![feedback_score, id, u]),
            None => conn.execute(sql, params![feedback_score, id]),
        }
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn delete_memory(&self, id: &str, user_id: Option<&str>) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "DELETE FROM memories WHERE id=?1 AND user_id=?2",
            None => "DELETE FROM memories WHERE id=?1 AND user_id IS NULL",
        };
        match user_id {
            Some(u) => conn.execute(sql, params![id, u]),
            None => conn.execute(sql, params![id]),
        }
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_memory(&self, id: &str, user_id: Option<&str>) -> OmResult<Option<Memory>> {
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "SELECT * FROM memories WHERE id=?1 AND user_id=?2",
            None => "SELECT * FROM memories WHERE id=?1 AND user_id IS NULL",
        };
        let result = match user_id {
            Some(u) => conn.query_row(sql, params![id, u], row_to_memory),
            None => conn.query_row(sql, params![id], row_to_memory),
        };
        result.optional().map_err(|e| OmError::Storage(e.to_string()))
    }

    async fn get_memory_by_simhash(&self, simhash: &str, user_id: Option<&str>) -> OmResult<Option<Memory>> {
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "SELECT * FROM memories WHERE simhash=?1 AND user_id=?2 ORDER BY salience DESC LIMIT 1",
            None => "SELECT * FROM memories WHERE simhash=?1 AND user_id IS NULL ORDER BY salience DESC LIMIT 1",
        };
        let result = match user_id {
            Some(u) => conn.query_row(sql, params![simhash, u], row_to_memory),
            None => conn.query_row(sql, params![simhash], row_to_memory),
        };
        result.optional().map_err(|e| OmError::Storage(e.to_string()))
    }

    async fn get_memories_bulk(&self, ids: &[String], user_id: Option<&str>) -> OmResult<Vec<Memory>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let conn = self.shared.conn.lock().await;
        let placeholders = ids.iter().enumerate().map(|(i, _)| format!("?{}", i + 1)).collect::<Vec<_>>().join(",");
        let tenant_idx = ids.len() + 1;
        let sql = match user_id {
            Some(_) => format!("SELECT * FROM memories WHERE id IN ({placeholders}) AND user_id=?{tenant_idx}"),
            None => format!("SELECT * FROM memories WHERE id IN ({placeholders}) AND user_id IS NULL"),
        };
        let mut stmt = conn.prepare(&sql).map_err(|e| OmError::Storage(e.to_string()))?;
        let mut sql_params: Vec<Box<dyn rusqlite::ToSql>> = ids.iter().map(|i| Box::new(i.clone()) as Box<dyn rusqlite::ToSql>).collect();
        if let Some(u) = user_id {
            sql_params.push(Box::new(u.to_string()));
        }
        let refs: Vec<&dyn rusqlite::ToSql> = sql_params.iter().map(|b| b.as_ref()).collect();
        let rows = stmt
            .query_map(refs.as_slice(), row_to_memory)
            .map_err(|e| OmError::Storage(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(|e| OmError::Storage(e.to_string()))
    }

    /// `None` counts across every tenant (mirrors `list_memories`'s cursor
    /// scan, used by the decay maintenance job); `Some` scopes to one.
    async fn count_memories(&self, user_id: Option<&str>) -> OmResult<usize> {
        let conn = self.shared.conn.lock().await;
        let count: i64 = match user_id {
            Some(u) => conn
                .query_row("SELECT COUNT(*) FROM memories WHERE user_id=?1", params![u], |row| row.get(0))
                .map_err(|e| OmError::Storage(e.to_string()))?,
            None => conn
                .query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))
                .map_err(|e| OmError::Storage(e.to_string()))?,
        };
        Ok(count as usize)
    }

    async fn list_memories(
        &self,
        user_id: Option<&str>,
        sector: Option<Sector>,
        cursor: Option<(DateTime<Utc>, String)>,
        limit: usize,
    ) -> OmResult<Vec<Memory>> {
        let conn = self.shared.conn.lock().await;
        let mut clauses = vec![];
        let mut sql_params: Vec<Box<dyn rusqlite::ToSql>> = vec![];
        if let Some(u) = user_id {
            clauses.push(format!("user_id = ?{}", sql_params.len() + 1));
            sql_params.push(Box::new(u.to_string()));
        }
        if let Some(s) = sector {
            clauses.push(format!("primary_sector = ?{}", sql_params.len() + 1));
            sql_params.push(Box::new(s.as_str().to_string()));
        }
        let order_by;
        if let Some((created, id)) = cursor {
            clauses.push(format!(
                "(created_at > ?{} OR (created_at = ?{} AND id > ?{}))",
                sql_params.len() + 1,
                sql_params.len() + 1,
                sql_params.len() + 2
            ));
            sql_params.push(Box::new(to_rfc3339(created)));
            sql_params.push(Box::new(id));
            order_by = "ORDER BY created_at ASC, id ASC";
        } else {
            order_by = "ORDER BY created_at DESC";
        }
        let where_clause = if clauses.is_empty() { String::new() } else { format!("WHERE {}", clauses.join(" AND ")) };
        let sql = format!("SELECT * FROM memories {where_clause} {order_by} LIMIT {limit}");
        let mut stmt = conn.prepare(&sql).map_err(|e| OmError::Storage(e.to_string()))?;
        let refs: Vec<&dyn rusqlite::ToSql> = sql_params.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(refs.as_slice(), row_to_memory).map_err(|e| OmError::Storage(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(|e| OmError::Storage(e.to_string()))
    }

    async fn insert_waypoint(&self, waypoint: &Waypoint) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        conn.execute(
            "INSERT INTO waypoints (src_id, dst_id, user_id, weight, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6)
             ON CONFLICT(src_id, dst_id, user_id) DO UPDATE SET
                weight=excluded.weight, updated_at=excluded.updated_at",
            params![
                waypoint.src_id,
                waypoint.dst_id,
                waypoint.user_id,
                waypoint.clamped_weight(),
                to_rfc3339(waypoint.created_at),
                to_rfc3339(waypoint.updated_at),
            ],
        )
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
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "UPDATE waypoints SET weight=?1, updated_at=?2 WHERE src_id=?3 AND dst_id=?4 AND user_id=?5",
            None => "UPDATE waypoints SET weight=?1, updated_at=?2 WHERE src_id=?3 AND dst_id=?4 AND user_id IS NULL",
        };
        let now = to_rfc3339(Utc::now());
        match user_id {
            Some(u) => conn.execute(sql, params![weight.clamp(0.0, 1.0), now, src_id, dst_id, u]),
            None => conn.execute(sql, params![weight.clamp(0.0, 1.0), now, src_id, dst_id]),
        }
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_waypoints_by_src(&self, src_id: &str, user_id: Option<&str>) -> OmResult<Vec<Waypoint>> {
        self.get_neighbors(src_id, user_id).await
    }

    async fn get_neighbors(&self, src_id: &str, user_id: Option<&str>) -> OmResult<Vec<Waypoint>> {
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "SELECT src_id, dst_id, user_id, weight, created_at, updated_at FROM waypoints WHERE src_id=?1 AND user_id=?2",
            None => "SELECT src_id, dst_id, user_id, weight, created_at, updated_at FROM waypoints WHERE src_id=?1 AND user_id IS NULL",
        };
        let mut stmt = conn.prepare(sql).map_err(|e| OmError::Storage(e.to_string()))?;
        let mapper = |row: &Row| -> rusqlite::Result<Waypoint> {
            let created: String = row.get(4)?;
            let updated: String = row.get(5)?;
            Ok(Waypoint {
                src_id: row.get(0)?,
                dst_id: row.get(1)?,
                user_id: row.get(2)?,
                weight: row.get(3)?,
                created_at: parse_ts(&created).unwrap_or_else(|_| Utc::now()),
                updated_at: parse_ts(&updated).unwrap_or_else(|_| Utc::now()),
            })
        };
        let rows = match user_id {
            Some(u) => stmt.query_map(params![src_id, u], mapper),
            None => stmt.query_map(params![src_id], mapper),
        }
        .map_err(|e| OmError::Storage(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(|e| OmError::Storage(e.to_string()))
    }

    async fn delete_waypoints_touching(&self, id: &str, user_id: Option<&str>) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "DELETE FROM waypoints WHERE (src_id=?1 OR dst_id=?1) AND user_id=?2",
            None => "DELETE FROM waypoints WHERE (src_id=?1 OR dst_id=?1) AND user_id IS NULL",
        };
        match user_id {
            Some(u) => conn.execute(sql, params![id, u]),
            None => conn.execute(sql, params![id]),
        }
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn prune_waypoints(&self, threshold: f64) -> OmResult<usize> {
        let conn = self.shared.conn.lock().await;
        let n = conn
            .execute("DELETE FROM waypoints WHERE weight < ?1", params![threshold])
            .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(n)
    }

    async fn get_user(&self, user_id: &str) -> OmResult<Option<User>> {
        let conn = self.shared.conn.lock().await;
        conn.query_row(
            "SELECT user_id, summary, reflection_count, created_at, updated_at FROM users WHERE user_id=?1",
            params![user_id],
            |row| {
                let created: String = row.get(3)?;
                let updated: String = row.get(4)?;
                Ok(User {
                    user_id: row.get(0)?,
                    summary: row.get(1)?,
                    reflection_count: row.get::<_, i64>(2)? as u64,
                    created_at: parse_ts(&created).unwrap_or_else(|_| Utc::now()),
                    updated_at: parse_ts(&updated).unwrap_or_else(|_| Utc::now()),
                })
            },
        )
        .optional()
        .map_err(|e| OmError::Storage(e.to_string()))
    }

    async fn upsert_user(&self, user: &User) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        conn.execute(
            "INSERT INTO users (user_id, summary, reflection_count, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5)
             ON CONFLICT(user_id) DO UPDATE SET
                summary=excluded.summary, reflection_count=excluded.reflection_count, updated_at=excluded.updated_at",
            params![
                user.user_id,
                user.summary,
                user.reflection_count as i64,
                to_rfc3339(user.created_at),
                to_rfc3339(user.updated_at),
            ],
        )
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn insert_embed_log(&self, log: &EmbedLog) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        conn.execute(
            "INSERT INTO embed_logs (id, model, status, ts, err) VALUES (?1,?2,?3,?4,?5)",
            params![log.id, log.model, status_str(log.status), to_rfc3339(log.ts), log.err],
        )
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn update_embed_log(&self, log: &EmbedLog) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        conn.execute(
            "UPDATE embed_logs SET status=?1, ts=?2, err=?3 WHERE id=?4",
            params![status_str(log.status), to_rfc3339(log.ts), log.err, log.id],
        )
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn insert_temporal_fact(&self, fact: &TemporalFact) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        conn.execute(
            "INSERT INTO temporal_facts (id, user_id, subject, predicate, object, valid_from, valid_to)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![
                fact.id,
                fact.user_id,
                fact.subject,
                fact.predicate,
                fact.object,
                to_rfc3339(fact.valid_from),
                fact.valid_to.map(to_rfc3339),
            ],
        )
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn close_temporal_fact(&self, id: &str, valid_to: DateTime<Utc>) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        conn.execute(
            "UPDATE temporal_facts SET valid_to=?1 WHERE id=?2",
            params![to_rfc3339(valid_to), id],
        )
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn get_open_temporal_fact(
        &self,
        user_id: Option<&str>,
        subject: &str,
        predicate: &str,
    ) -> OmResult<Option<TemporalFact>> {
        let conn = self.shared.conn.lock().await;
        let sql = match user_id {
            Some(_) => "SELECT id, user_id, subject, predicate, object, valid_from, valid_to FROM temporal_facts
                        WHERE user_id=?1 AND subject=?2 AND predicate=?3 AND valid_to IS NULL",
            None => "SELECT id, user_id, subject, predicate, object, valid_from, valid_to FROM temporal_facts
                     WHERE user_id IS NULL AND subject=?1 AND predicate=?2 AND valid_to IS NULL",
        };
        let mapper = |row: &Row| -> rusqlite::Result<TemporalFact> {
            let valid_from: String = row.get(5)?;
            let valid_to: Option<String> = row.get(6)?;
            Ok(TemporalFact {
                id: row.get(0)?,
                user_id: row.get(1)?,
                subject: row.get(2)?,
                predicate: row.get(3)?,
                object: row.get(4)?,
                valid_from: parse_ts(&valid_from).unwrap_or_else(|_| Utc::now()),
                valid_to: valid_to.map(|v| parse_ts(&v).unwrap_or_else(|_| Utc::now())),
            })
        };
        let result = match user_id {
            Some(u) => conn.query_row(sql, params![u, subject, predicate], mapper),
            None => conn.query_row(sql, params![subject, predicate], mapper),
        };
        result.optional().map_err(|e| OmError::Storage(e.to_string()))
    }

    async fn record_stat(&self, stat: &Stats) -> OmResult<()> {
        let conn = self.shared.conn.lock().await;
        conn.execute(
            "INSERT INTO stats (event_type, count, ts) VALUES (?1,?2,?3)",
            params![stat.event_type, stat.count, to_rfc3339(stat.ts)],
        )
        .map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn list_stats(&self, event_type: Option<&str>, limit: usize) -> OmResult<Vec<Stats>> {
        let conn = self.shared.conn.lock().await;
        let mapper = |row: &rusqlite::Row| {
            let ts: String = row.get("ts")?;
            let event_type: String = row.get("event_type")?;
            let count: i64 = row.get("count")?;
            Ok((event_type, count, ts))
        };
        let raw: Vec<(String, i64, String)> = match event_type {
            Some(t) => {
                let mut stmt = conn
                    .prepare("SELECT * FROM stats WHERE event_type = ?1 ORDER BY ts DESC LIMIT ?2")
                    .map_err(|e| OmError::Storage(e.to_string()))?;
                stmt.query_map(params![t, limit as i64], mapper)
                    .map_err(|e| OmError::Storage(e.to_string()))?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| OmError::Storage(e.to_string()))?
            }
            None => {
                let mut stmt = conn
                    .prepare("SELECT * FROM stats ORDER BY ts DESC LIMIT ?1")
                    .map_err(|e| OmError::Storage(e.to_string()))?;
                stmt.query_map(params![limit as i64], mapper)
                    .map_err(|e| OmError::Storage(e.to_string()))?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| OmError::Storage(e.to_string()))?
            }
        };
        raw.into_iter()
            .map(|(event_type, count, ts)| Ok(Stats { event_type, count, ts: parse_ts(&ts)? }))
            .collect()
    }

    async fn begin(&self) -> OmResult<Box<dyn Transaction>> {
        let level = self.shared.begin().await?;
        Ok(Box::new(SqliteTransaction { shared: self.shared.clone(), level }))
    }
}

fn status_str(status: EmbedStatus) -> &'static str {
    match status {
        EmbedStatus::Pending => "pending",
        EmbedStatus::Completed => "completed",
        EmbedStatus::Failed => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_memory(id: &str, user_id: Option<&str>) -> Memory {
        Memory::new(
            id.to_string(),
            user_id.map(str::to_string),
            "hello world".to_string(),
            openmemory_core::memory::base::simhash64_hex("hello world"),
            Sector::Semantic,
            vec!["greeting".to_string()],
            serde_json::json!({}),
            vec![0.1, 0.2, 0.3],
            0.015,
        )
    }

    #[tokio::test]
    async fn insert_and_get_roundtrips() {
        let store = SqliteStore::open_in_memory().unwrap();
        let m = sample_memory("m1", Some("u1"));
        store.insert_memory(&m).await.unwrap();
        let fetched = store.get_memory("m1", Some("u1")).await.unwrap().unwrap();
        assert_eq!(fetched.content, "hello world");
        assert_eq!(fetched.primary_sector, Sector::Semantic);
    }

    #[tokio::test]
    async fn tenant_isolation_on_get() {
        let store = SqliteStore::open_in_memory().unwrap();
        let m = sample_memory("m1", Some("u1"));
        store.insert_memory(&m).await.unwrap();
        assert!(store.get_memory("m1", Some("u2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn nested_transaction_commit_persists() {
        let store = SqliteStore::open_in_memory().unwrap();
        let outer = store.begin().await.unwrap();
        store.insert_memory(&sample_memory("m1", Some("u1"))).await.unwrap();
        let inner = store.begin().await.unwrap();
        store.insert_memory(&sample_memory("m2", Some("u1"))).await.unwrap();
        inner.commit().await.unwrap();
        outer.commit().await.unwrap();
        assert!(store.get_memory("m1", Some("u1")).await.unwrap().is_some());
        assert!(store.get_memory("m2", Some("u1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn nested_rollback_discards_only_inner() {
        let store = SqliteStore::open_in_memory().unwrap();
        let outer = store.begin().await.unwrap();
        store.insert_memory(&sample_memory("m1", Some("u1"))).await.unwrap();
        let inner = store.begin().await.unwrap();
        store.insert_memory(&sample_memory("m2", Some("u1"))).await.unwrap();
        inner.rollback().await.unwrap();
        outer.commit().await.unwrap();
        assert!(store.get_memory("m1", Some("u1")).await.unwrap().is_some());
        assert!(store.get_memory("m2", Some("u1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn waypoint_weight_clamped_on_insert() {
        let store = SqliteStore::open_in_memory().unwrap();
        let wp = Waypoint::new("a".into(), "b".into(), Some("u1".into()), 1.5);
        store.insert_waypoint(&wp).await.unwrap();
        let neighbors = store.get_neighbors("a", Some("u1")).await.unwrap();
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].weight, 1.0);
    }

    #[tokio::test]
    async fn delete_memory_is_tenant_scoped_noop_for_foreign_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_memory(&sample_memory("m1", Some("u1"))).await.unwrap();
        store.delete_memory("m1", Some("u2")).await.unwrap();
        assert!(store.get_memory("m1", Some("u1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn vec_blob_roundtrip() {
        let v = vec![0.5f32, -1.25, 3.0];
        assert_eq!(blob_to_vec(&vec_to_blob(&v)), v);
    }
}
