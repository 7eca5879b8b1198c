//! Deduplicated provider fallback chain (§4.4): `[configured, ...fallbacks]`,
//! skipping unhealthy providers, degrading to synthetic on total failure —
//! the chain itself never errors the caller.

use openmemory_core::config::{EmbedKind, EmbeddingConfig};
use openmemory_core::errors::OmResult;
use openmemory_core::traits::EmbeddingProvider;
use tracing::warn;

use crate::providers;

pub struct FallbackChain {
    providers: Vec<Box<dyn EmbeddingProvider>>,
}

impl FallbackChain {
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let mut kinds = vec![config.embed_kind];
        for k in &config.embedding_fallback {
            if !kinds.contains(k) {
                kinds.push(*k);
            }
        }
        if !kinds.contains(&EmbedKind::Synthetic) {
            kinds.push(EmbedKind::Synthetic);
        }

        let providers = kinds.into_iter().map(|k| providers::create_provider(k, config)).collect();
        Self { providers }
    }

    pub fn active_provider_name(&self) -> &str {
        self.providers.iter().find(|p| p.is_available()).map(|p| p.name()).unwrap_or("none")
    }

    /// Embeds via the first healthy provider that succeeds. Since the
    /// chain always contains `Synthetic` (which never errors), this only
    /// returns `Err` if the chain itself is empty.
    pub async fn embed_one(&self, text: &str) -> OmResult<(Vec<f32>, &str)> {
        let mut last_err = None;
        for p in &self.providers {
            if !p.is_available() {
                continue;
            }
            match p.embed_one(text).await {
                Ok(v) => return Ok((resize(v, p.dimensions()), p.name())),
                Err(e) => {
                    warn!(provider = p.name(), error = %e, "provider failed, trying next in chain");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| openmemory_core::errors::OmError::Internal("embedding chain is empty".into())))
    }

    pub async fn embed_batch(&self, texts: &[String]) -> OmResult<(Vec<Vec<f32>>, &str)> {
        let mut last_err = None;
        for p in &self.providers {
            if !p.is_available() {
                continue;
            }
            match p.embed_batch(texts).await {
                Ok(vs) => return Ok((vs.into_iter().map(|v| resize(v, p.dimensions())).collect(), p.name())),
                Err(e) => {
                    warn!(provider = p.name(), error = %e, "batch embed failed, trying next in chain");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| openmemory_core::errors::OmError::Internal("embedding chain is empty".into())))
    }
}

/// Resize (pad/slice) to the declared dimension, per `embed_for_sector`'s
/// contract — a provider that drifted from its configured dimension
/// shouldn't break every downstream consumer.
fn resize(mut v: Vec<f32>, dims: usize) -> Vec<f32> {
    if v.len() > dims {
        v.truncate(dims);
    } else if v.len() < dims {
        v.resize(dims, 0.0);
    }
    v
}

impl Default for FallbackChain {
    fn default() -> Self {
        Self::from_config(&EmbeddingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openmemory_core::config::EmbeddingConfig;

    #[tokio::test]
    async fn synthetic_always_present_as_last_resort() {
        let config = EmbeddingConfig { embed_kind: EmbedKind::Synthetic, vec_dim: 64, ..Default::default() };
        let chain = FallbackChain::from_config(&config);
        let (v, name) = chain.embed_one("hello").await.unwrap();
        assert_eq!(name, "synthetic");
        assert_eq!(v.len(), 64);
    }

    #[tokio::test]
    async fn resize_pads_short_vectors() {
        assert_eq!(resize(vec![1.0, 2.0], 4), vec![1.0, 2.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn resize_truncates_long_vectors() {
        assert_eq!(resize(vec![1.0, 2.0, 3.0], 2), vec![1.0, 2.0]);
    }
}
