mod cloud;
mod local;
mod synthetic;

pub use cloud::{CloudKind, CloudProvider};
pub use local::LocalProvider;
pub use synthetic::SyntheticProvider;

use openmemory_core::config::{EmbedKind, EmbeddingConfig};
use openmemory_core::traits::EmbeddingProvider;

/// Instantiates the concrete provider for a configured `EmbedKind`.
/// `Synthetic` is the only kind that never needs network config.
pub fn create_provider(kind: EmbedKind, config: &EmbeddingConfig) -> Box<dyn EmbeddingProvider> {
    match kind {
        EmbedKind::Synthetic => Box::new(SyntheticProvider::new(config.vec_dim)),
        EmbedKind::Openai => Box::new(CloudProvider::new(
            CloudKind::OpenAi,
            config.openai_base_url.clone(),
            config.openai_api_key.clone().unwrap_or_default(),
            "text-embedding-3-small".to_string(),
            config.vec_dim,
            config.provider_timeout_secs,
        )),
        EmbedKind::Gemini => Box::new(CloudProvider::new(
            CloudKind::Gemini,
            config.gemini_base_url.clone(),
            config.gemini_api_key.clone().unwrap_or_default(),
            "embedding-001".to_string(),
            config.vec_dim,
            config.provider_timeout_secs,
        )),
        EmbedKind::Ollama | EmbedKind::Local => {
            Box::new(LocalProvider::new(config.ollama_base_url.clone(), "nomic-embed-text".to_string(), config.vec_dim, config.provider_timeout_secs))
        }
        EmbedKind::RouterCpu => Box::new(SyntheticProvider::new(config.vec_dim)),
    }
}
