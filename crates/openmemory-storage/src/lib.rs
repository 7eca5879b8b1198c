//! # openmemory-storage
//!
//! Durable `Store` and `VectorStore` backends for the Hierarchical Storage
//! Graph: SQLite (single-file, WAL-mode, the default) and Postgres
//! (pgvector-backed, for multi-writer deployments). Both backends
//! implement the same `openmemory_core::traits::{Store, VectorStore}`
//! contracts and share the nested-transaction discipline described in
//! `openmemory_core::traits::Transaction` — `BEGIN`/`SAVEPOINT` depth
//! counters, not a transaction parameter threaded through every call.

pub mod postgres;
pub mod sqlite;

pub use postgres::{PostgresStore, PostgresTransaction, PostgresVectorStore};
pub use sqlite::{SqliteStore, SqliteTransaction, SqliteVectorStore};

use openmemory_core::config::{MetadataBackend, StorageConfig};
use openmemory_core::errors::OmResult;
use openmemory_core::traits::{Store, VectorStore};

/// Opens the `Store`/`VectorStore` pair selected by `config.metadata_backend`.
/// Callers that need a backend-agnostic handle should use [`Self::store`]
/// and [`Self::vector_store`] rather than matching on the variant.
pub enum StorageBackend {
    Sqlite(SqliteStore),
    Postgres(PostgresStore),
}

impl StorageBackend {
    pub async fn open(config: &StorageConfig) -> OmResult<Self> {
        match config.metadata_backend {
            MetadataBackend::Sqlite => {
                let store = SqliteStore::open(std::path::Path::new(&config.sqlite.db_path), &config.sqlite)?;
                Ok(Self::Sqlite(store))
            }
            MetadataBackend::Postgres => {
                let store = PostgresStore::connect(&config.postgres).await?;
                Ok(Self::Postgres(store))
            }
        }
    }

    pub fn store(&self) -> &dyn Store {
        match self {
            Self::Sqlite(s) => s,
            Self::Postgres(s) => s,
        }
    }

    pub fn vector_store(&self) -> Box<dyn VectorStore> {
        match self {
            Self::Sqlite(s) => Box::new(s.vector_store()),
            Self::Postgres(s) => Box::new(s.vector_store()),
        }
    }
}
