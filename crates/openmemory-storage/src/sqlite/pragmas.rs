//! PRAGMA configuration applied to every SQLite connection: WAL mode,
//! NORMAL sync, configurable mmap/cache sizing, busy_timeout, foreign keys.

use openmemory_core::config::SqliteConfig;
use openmemory_core::errors::{OmError, OmResult};
use rusqlite::Connection;

pub fn apply_pragmas(conn: &Connection, config: &SqliteConfig) -> OmResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA mmap_size = {mmap};
        PRAGMA cache_size = -{cache_kb};
        PRAGMA busy_timeout = {busy_ms};
        PRAGMA foreign_keys = ON;
        ",
        mmap = config.mmap_size_bytes,
        cache_kb = config.cache_size_kb,
        busy_ms = config.busy_timeout_ms,
    ))
    .map_err(|e| OmError::Storage(e.to_string()))?;
    Ok(())
}

pub fn verify_wal_mode(conn: &Connection) -> OmResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| OmError::Storage(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
