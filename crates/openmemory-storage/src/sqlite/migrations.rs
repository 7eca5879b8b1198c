//! Ordered, idempotent schema migrations, tracked in `schema_version`.
//! A fresh install applies every migration in order; an existing install
//! applies only those with version strictly greater than the stored one.
//! Duplicate-column errors on an idempotent `ALTER TABLE ... ADD COLUMN`
//! step are swallowed; any other failure aborts and the whole batch is
//! rolled back by the caller's transaction.

use openmemory_core::errors::{OmError, OmResult};
use rusqlite::Connection;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init_memories",
        sql: "
        CREATE TABLE IF NOT EXISTS memories (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            segment INTEGER NOT NULL DEFAULT 0,
            content TEXT NOT NULL,
            simhash TEXT NOT NULL,
            primary_sector TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '[]',
            meta TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_seen_at TEXT NOT NULL,
            salience REAL NOT NULL DEFAULT 0.5,
            decay_lambda REAL NOT NULL DEFAULT 0.015,
            version INTEGER NOT NULL DEFAULT 1,
            mean_dim INTEGER NOT NULL DEFAULT 0,
            mean_vec BLOB,
            compressed_vec BLOB,
            feedback_score REAL NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_memories_sector ON memories(primary_sector);
        CREATE INDEX IF NOT EXISTS idx_memories_simhash ON memories(simhash);
        CREATE INDEX IF NOT EXISTS idx_memories_user ON memories(user_id);
        CREATE INDEX IF NOT EXISTS idx_memories_last_seen ON memories(last_seen_at);
        CREATE INDEX IF NOT EXISTS idx_memories_created ON memories(created_at);
        ",
    },
    Migration {
        version: 2,
        name: "init_vectors",
        sql: "
        CREATE TABLE IF NOT EXISTS vectors (
            id TEXT NOT NULL,
            sector TEXT NOT NULL,
            user_id TEXT,
            v BLOB NOT NULL,
            dim INTEGER NOT NULL,
            PRIMARY KEY (id, sector)
        );
        CREATE INDEX IF NOT EXISTS idx_vectors_sector ON vectors(sector);
        CREATE INDEX IF NOT EXISTS idx_vectors_user ON vectors(user_id);
        ",
    },
    Migration {
        version: 3,
        name: "init_waypoints",
        sql: "
        CREATE TABLE IF NOT EXISTS waypoints (
            src_id TEXT NOT NULL,
            dst_id TEXT NOT NULL,
            user_id TEXT,
            weight REAL NOT NULL DEFAULT 0.5,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (src_id, dst_id, user_id)
        );
        CREATE INDEX IF NOT EXISTS idx_waypoints_src ON waypoints(src_id);
        CREATE INDEX IF NOT EXISTS idx_waypoints_dst ON waypoints(dst_id);
        CREATE INDEX IF NOT EXISTS idx_waypoints_user ON waypoints(user_id);
        ",
    },
    Migration {
        version: 4,
        name: "init_users_embed_logs_stats",
        sql: "
        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            summary TEXT,
            reflection_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS embed_logs (
            id TEXT PRIMARY KEY,
            model TEXT NOT NULL,
            status TEXT NOT NULL,
            ts TEXT NOT NULL,
            err TEXT
        );
        CREATE TABLE IF NOT EXISTS stats (
            event_type TEXT NOT NULL,
            count INTEGER NOT NULL,
            ts TEXT NOT NULL
        );
        ",
    },
    Migration {
        version: 5,
        name: "init_temporal",
        sql: "
        CREATE TABLE IF NOT EXISTS temporal_facts (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            subject TEXT NOT NULL,
            predicate TEXT NOT NULL,
            object TEXT NOT NULL,
            valid_from TEXT NOT NULL,
            valid_to TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_temporal_facts_timeline
            ON temporal_facts(user_id, subject, predicate);
        CREATE TABLE IF NOT EXISTS temporal_edges (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            from_fact_id TEXT NOT NULL,
            to_fact_id TEXT NOT NULL,
            relation TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        ",
    },
];

pub fn run_migrations(conn: &Connection) -> OmResult<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .map_err(|e| OmError::Schema(e.to_string()))?;

    let current: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
        .map_err(|e| OmError::Schema(e.to_string()))?;

    for m in MIGRATIONS {
        if m.version <= current {
            continue;
        }
        tracing::info!(version = m.version, name = m.name, "applying sqlite migration");
        match conn.execute_batch(m.sql) {
            Ok(()) => {}
            Err(e) if is_duplicate_column(&e) => {
                tracing::debug!(version = m.version, "idempotent step skipped duplicate column");
            }
            Err(e) => return Err(OmError::Schema(format!("migration {} failed: {e}", m.version))),
        }
        conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [m.version])
            .map_err(|e| OmError::Schema(e.to_string()))?;
    }
    Ok(())
}

fn is_duplicate_column(err: &rusqlite::Error) -> bool {
    err.to_string().contains("duplicate column name")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count as usize, MIGRATIONS.len());
    }

    #[test]
    fn creates_expected_tables() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        for table in ["memories", "vectors", "waypoints", "users", "embed_logs", "stats"] {
            let exists: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "missing table {table}");
        }
    }
}
