use serde::{Deserialize, Serialize};

use super::defaults;

/// Which Store backend to instantiate. `openmemory-storage::StorageEngine`
/// dispatches on this at construction time; both backends implement the
/// same `openmemory_core::traits::Store` trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    #[default]
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    pub db_path: String,
    /// Busy-timeout in milliseconds before a locked write fails.
    pub busy_timeout_ms: u64,
    /// Page cache size, in KiB (negative pragma convention: `-size_kb`).
    pub cache_size_kb: i64,
    pub mmap_size_bytes: i64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            db_path: "openmemory.db".to_string(),
            busy_timeout_ms: 5_000,
            cache_size_kb: 8_192,
            mmap_size_bytes: 128 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub db: String,
    pub user: String,
    pub password: String,
    pub ssl: bool,
    pub schema: String,
    pub table_prefix: String,
    /// Overrides the discrete fields above when set.
    pub connection_string: Option<String>,
    pub pool_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub metadata_backend: MetadataBackend,
    pub sqlite: SqliteConfig,
    pub postgres: PostgresConfig,
    pub seg_size: usize,
    pub summary_max_length: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            metadata_backend: MetadataBackend::default(),
            sqlite: SqliteConfig::default(),
            postgres: PostgresConfig {
                port: 5432,
                pool_size: 8,
                ..PostgresConfig::default()
            },
            seg_size: defaults::DEFAULT_SEG_SIZE,
            summary_max_length: defaults::DEFAULT_SUMMARY_MAX_LENGTH,
        }
    }
}
