use std::sync::Arc;

use async_trait::async_trait;
use openmemory_core::errors::OmResult;
use openmemory_core::traits::Transaction;

use super::conn::SqliteConn;

pub struct SqliteTransaction {
    pub(crate) shared: Arc<SqliteConn>,
    pub(crate) level: usize,
}

#[async_trait]
impl Transaction for SqliteTransaction {
    async fn commit(self: Box<Self>) -> OmResult<()> {
        self.shared.commit(self.level).await
    }

    async fn rollback(self: Box<Self>) -> OmResult<()> {
        self.shared.rollback(self.level).await
    }
}
