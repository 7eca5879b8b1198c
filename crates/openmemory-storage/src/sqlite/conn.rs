use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use openmemory_core::errors::{OmError, OmResult};
use rusqlite::Connection;
use tokio::sync::Mutex as AsyncMutex;

/// The single SQLite connection shared by a [`super::store::SqliteStore`]
/// and every [`super::transaction::SqliteTransaction`] it hands out.
/// `depth` tracks nesting so `begin` can decide between `BEGIN` and
/// `SAVEPOINT sp_n`, per the depth-counter/savepoint discipline in the
/// design notes.
pub(crate) struct SqliteConn {
    pub(crate) conn: AsyncMutex<Connection>,
    depth: AtomicUsize,
}

impl SqliteConn {
    pub(crate) fn new(conn: Connection) -> Arc<Self> {
        Arc::new(Self { conn: AsyncMutex::new(conn), depth: AtomicUsize::new(0) })
    }

    /// Begins a new nesting level, issuing `BEGIN` at depth 1 or
    /// `SAVEPOINT sp_n` for deeper levels. Returns the level just entered.
    pub(crate) async fn begin(&self) -> OmResult<usize> {
        let guard = self.conn.lock().await;
        let level = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        let sql = if level == 1 { "BEGIN".to_string() } else { format!("SAVEPOINT sp_{level}") };
        guard.execute_batch(&sql).map_err(|e| OmError::Transaction(e.to_string()))?;
        Ok(level)
    }

    pub(crate) async fn commit(&self, level: usize) -> OmResult<()> {
        let guard = self.conn.lock().await;
        let sql = if level == 1 { "COMMIT".to_string() } else { format!("RELEASE sp_{level}") };
        guard.execute_batch(&sql).map_err(|e| OmError::Transaction(e.to_string()))?;
        drop(guard);
        self.depth.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    pub(crate) async fn rollback(&self, level: usize) -> OmResult<()> {
        let guard = self.conn.lock().await;
        let sql = if level == 1 {
            "ROLLBACK".to_string()
        } else {
            format!("ROLLBACK TO sp_{level}; RELEASE sp_{level}")
        };
        guard.execute_batch(&sql).map_err(|e| OmError::Transaction(e.to_string()))?;
        drop(guard);
        self.depth.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
