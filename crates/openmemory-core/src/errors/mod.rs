//! Error taxonomy. See §7 of the design spec: `ProviderError` is
//! deliberately absent from this public enum — the embedding fallback
//! chain converts provider failures into a degraded-but-successful
//! synthetic result and never surfaces them to callers.

use thiserror::Error;

pub type OmResult<T> = Result<T, OmError>;

#[derive(Debug, Error)]
pub enum OmError {
    /// Caller input failed preconditions: missing tenant on a mutation,
    /// invalid sector, oversize payload.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A mutation targeted a row that does not exist (or isn't visible to
    /// the caller's tenant). `get_*` reads prefer `Option::None` instead.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// begin/commit/rollback contract violation. Callers MUST NOT retry
    /// blindly on this.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Migration application failed. Fatal at startup.
    #[error("schema error: {0}")]
    Schema(String),

    /// `max_active` query concurrency exceeded.
    #[error("budget exceeded: max_active={max_active}")]
    BudgetExceeded { max_active: usize },

    /// Opaque backend failure (SQLite/Postgres driver error) wrapped for
    /// display; the originating error is not `Send`-safe across the
    /// trait-object boundary so we capture its message instead.
    #[error("storage backend error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl OmError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}
