use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbedKind {
    #[default]
    Synthetic,
    Openai,
    Gemini,
    Ollama,
    Local,
    RouterCpu,
}

/// Single batch call vs per-sector calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbedMode {
    #[default]
    Simple,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub embed_kind: EmbedKind,
    /// Ordered fallback chain, tried after `embed_kind`.
    pub embedding_fallback: Vec<EmbedKind>,
    pub vec_dim: usize,
    pub embed_mode: EmbedMode,
    pub adv_embed_parallel: bool,
    pub router_sector_models: HashMap<String, String>,
    pub hybrid_fusion: bool,
    /// Per-call HTTP timeout (seconds) for cloud/local providers.
    pub provider_timeout_secs: u64,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub ollama_base_url: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            embed_kind: EmbedKind::default(),
            embedding_fallback: vec![EmbedKind::Synthetic],
            vec_dim: defaults::DEFAULT_VEC_DIM,
            embed_mode: EmbedMode::default(),
            adv_embed_parallel: true,
            router_sector_models: HashMap::new(),
            hybrid_fusion: true,
            provider_timeout_secs: 30,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            gemini_api_key: None,
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
        }
    }
}

impl EmbeddingConfig {
    /// Bounded-parallelism degree for `embed_query_all_sectors` in advanced
    /// mode: 4 by default, 2 when the chosen provider is CPU-only local.
    pub fn parallelism(&self) -> usize {
        if matches!(self.embed_kind, EmbedKind::Local | EmbedKind::RouterCpu) {
            defaults::DEFAULT_ADV_EMBED_PARALLEL_LIMIT_CPU
        } else {
            defaults::DEFAULT_ADV_EMBED_PARALLEL_LIMIT
        }
    }
}
