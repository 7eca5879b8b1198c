use std::sync::Arc;

use deadpool_postgres::{Object, Pool};
use openmemory_core::errors::{OmError, OmResult};
use tokio::sync::Mutex as AsyncMutex;

struct TxState {
    client: Arc<Object>,
    depth: usize,
}

/// Shared pool handle plus the single in-flight ambient transaction, if
/// any. Mirrors `super::super::sqlite::conn::SqliteConn`'s depth-counter
/// discipline, but holds a checked-out pool connection only while a
/// transaction is open; outside a transaction every call checks out its
/// own short-lived connection.
pub(crate) struct PgConn {
    pool: Pool,
    tx: AsyncMutex<Option<TxState>>,
}

impl PgConn {
    pub(crate) fn new(pool: Pool) -> Arc<Self> {
        Arc::new(Self { pool, tx: AsyncMutex::new(None) })
    }

    /// The client to issue the next statement against: the ambient
    /// transaction's connection if one is open, otherwise a fresh
    /// checkout from the pool.
    pub(crate) async fn client(&self) -> OmResult<Arc<Object>> {
        let guard = self.tx.lock().await;
        if let Some(state) = guard.as_ref() {
            return Ok(state.client.clone());
        }
        drop(guard);
        let obj = self.pool.get().await.map_err(|e| OmError::Storage(e.to_string()))?;
        Ok(Arc::new(obj))
    }

    pub(crate) async fn begin(&self) -> OmResult<usize> {
        let mut guard = self.tx.lock().await;
        if let Some(state) = guard.as_mut() {
            state.depth += 1;
            let level = state.depth;
            state
                .client
                .batch_execute(&format!("SAVEPOINT sp_{level}"))
                .await
                .map_err(|e| OmError::Transaction(e.to_string()))?;
            return Ok(level);
        }
        let obj = self.pool.get().await.map_err(|e| OmError::Storage(e.to_string()))?;
        obj.batch_execute("BEGIN").await.map_err(|e| OmError::Transaction(e.to_string()))?;
        *guard = Some(TxState { client: Arc::new(obj), depth: 1 });
        Ok(1)
    }

    pub(crate) async fn commit(&self, level: usize) -> OmResult<()> {
        let mut guard = self.tx.lock().await;
        let state = guard.as_mut().ok_or_else(|| OmError::Transaction("no active transaction".into()))?;
        if level == 1 {
            state.client.batch_execute("COMMIT").await.map_err(|e| OmError::Transaction(e.to_string()))?;
            *guard = None;
        } else {
            state
                .client
                .batch_execute(&format!("RELEASE sp_{level}"))
                .await
                .map_err(|e| OmError::Transaction(e.to_string()))?;
            state.depth -= 1;
        }
        Ok(())
    }

    pub(crate) async fn rollback(&self, level: usize) -> OmResult<()> {
        let mut guard = self.tx.lock().await;
        let state = guard.as_mut().ok_or_else(|| OmError::Transaction("no active transaction".into()))?;
        if level == 1 {
            state.client.batch_execute("ROLLBACK").await.map_err(|e| OmError::Transaction(e.to_string()))?;
            *guard = None;
        } else {
            state
                .client
                .batch_execute(&format!("ROLLBACK TO sp_{level}; RELEASE sp_{level}"))
                .await
                .map_err(|e| OmError::Transaction(e.to_string()))?;
            state.depth -= 1;
        }
        Ok(())
    }
}
