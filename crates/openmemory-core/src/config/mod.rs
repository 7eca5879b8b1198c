mod defaults;
mod dynamics_config;
mod embedding_config;
mod maintenance_config;
mod ops_config;
mod retrieval_config;
mod storage_config;

pub use dynamics_config::DynamicsConfig;
pub use embedding_config::{EmbedKind, EmbedMode, EmbeddingConfig};
pub use maintenance_config::MaintenanceConfig;
pub use ops_config::OpsConfig;
pub use retrieval_config::RetrievalConfig;
pub use storage_config::{MetadataBackend, PostgresConfig, SqliteConfig, StorageConfig};

use serde::{Deserialize, Serialize};

/// Top-level configuration, composed of one config struct per subsystem.
/// Loaded from TOML (and environment overrides) by the HTTP/MCP
/// collaborator; the core only ever consumes the parsed struct.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OpenMemoryConfig {
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub dynamics: DynamicsConfig,
    pub maintenance: MaintenanceConfig,
    pub ops: OpsConfig,
}

impl OpenMemoryConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
