use std::sync::Arc;

use async_trait::async_trait;
use openmemory_core::errors::OmResult;
use openmemory_core::traits::Transaction;

use super::conn::PgConn;

pub struct PostgresTransaction {
    pub(crate) shared: Arc<PgConn>,
    pub(crate) level: usize,
}

#[async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(self: Box<Self>) -> OmResult<()> {
        self.shared.commit(self.level).await
    }

    async fn rollback(self: Box<Self>) -> OmResult<()> {
        self.shared.rollback(self.level).await
    }
}
