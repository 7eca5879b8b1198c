use async_trait::async_trait;

use crate::errors::OmResult;

/// A nested-transaction handle. Modeled as a depth counter wrapping a
/// SAVEPOINT discipline (see design notes): the first `begin` issues
/// `BEGIN`, nested `begin`s issue `SAVEPOINT sp_n`; `rollback` on a nested
/// handle issues `ROLLBACK TO sp_n; RELEASE sp_n`, `commit` issues
/// `RELEASE sp_n`; the outermost `commit`/`rollback` issues `COMMIT`/
/// `ROLLBACK`. Commit of an outer scope persists inner committed
/// savepoints; rollback of an inner scope discards only that scope.
#[async_trait]
pub trait Transaction: Send {
    async fn commit(self: Box<Self>) -> OmResult<()>;
    async fn rollback(self: Box<Self>) -> OmResult<()>;
}
