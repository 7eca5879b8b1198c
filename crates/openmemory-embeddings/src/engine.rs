//! `EmbeddingEngine` — main entry point for `openmemory-embeddings`.
//! Coordinates the fallback chain, routing, fusion, and the result cache,
//! and implements the three embedder contracts from §4.4.

use std::sync::Arc;
use std::time::Duration;

use openmemory_core::config::EmbeddingConfig;
use openmemory_core::errors::{OmError, OmResult};
use openmemory_core::memory::Sector;
use openmemory_core::models::EmbedLog;
use openmemory_core::traits::Store;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::cache::ResultCache;
use crate::chain::FallbackChain;
use crate::fusion;
use crate::providers::SyntheticProvider;
use crate::router::Router;

const MULTI_SECTOR_MAX_ATTEMPTS: u32 = 3;
const MULTI_SECTOR_BACKOFF: [u64; 3] = [1, 2, 4];

pub struct EmbeddingEngine {
    chain: FallbackChain,
    synthetic: SyntheticProvider,
    router: Router,
    cache: ResultCache,
    config: EmbeddingConfig,
}

impl EmbeddingEngine {
    pub fn new(config: EmbeddingConfig) -> Self {
        let chain = FallbackChain::from_config(&config);
        let synthetic = SyntheticProvider::new(config.vec_dim);
        let router = Router::from_config(&config);

        info!(provider = chain.active_provider_name(), dims = config.vec_dim, "EmbeddingEngine initialized");

        Self { chain, synthetic, router, cache: ResultCache::new(), config }
    }

    pub fn dimensions(&self) -> usize {
        self.config.vec_dim
    }

    fn tier(&self) -> &'static str {
        if self.config.embed_kind == openmemory_core::config::EmbedKind::Synthetic {
            "fast"
        } else if self.config.hybrid_fusion {
            "smart"
        } else {
            "hybrid"
        }
    }

    /// Guarantees a vector of length `vec_dim` (§4.4 contract).
    pub async fn embed_for_sector(&self, text: &str, sector: Sector) -> OmResult<Vec<f32>> {
        let key = ResultCache::key(self.chain.active_provider_name(), self.tier(), &[sector], text);
        if let Some(mut cached) = self.cache.get(&key) {
            if let Some((_, v)) = cached.pop() {
                return Ok(v);
            }
        }

        let synthetic_vec = self.synthetic.embed_for_sector(text, sector);
        let result = if self.config.embed_kind == openmemory_core::config::EmbedKind::Synthetic {
            synthetic_vec
        } else {
            let _routed_model = self.router.route(sector);
            match self.chain.embed_one(text).await {
                Ok((semantic_vec, provider_name)) if provider_name != "synthetic" && self.config.hybrid_fusion => {
                    let (w1, w2) = fusion::sector_fusion_weights(sector);
                    fusion::fuse(&synthetic_vec, &semantic_vec, w1, w2)
                }
                Ok((semantic_vec, _)) => semantic_vec,
                Err(e) => {
                    warn!(error = %e, "embed_for_sector fell back to synthetic");
                    synthetic_vec
                }
            }
        };

        self.cache.put(key, vec![(sector, result.clone())]);
        Ok(result)
    }

    /// Bounded-parallelism fan-out over `sectors`, default 4 concurrent
    /// calls (2 on CPU-only local providers), per `EmbeddingConfig::parallelism`.
    pub async fn embed_query_all_sectors(&self, text: &str, sectors: &[Sector]) -> OmResult<Vec<(Sector, Vec<f32>)>> {
        let key = ResultCache::key(self.chain.active_provider_name(), self.tier(), sectors, text);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let semaphore = Arc::new(Semaphore::new(self.config.parallelism().max(1)));
        let mut handles = Vec::with_capacity(sectors.len());
        for &sector in sectors {
            let permit = semaphore.clone().acquire_owned().await.map_err(|e| OmError::Internal(e.to_string()))?;
            let vec = self.embed_for_sector(text, sector).await?;
            drop(permit);
            handles.push((sector, vec));
        }

        self.cache.put(key, handles.clone());
        Ok(handles)
    }

    /// Stores a pending `EmbedLog` row, attempts the embedding with
    /// exponential backoff (1s, 2s, 4s), and marks the log
    /// `completed`/`failed` (§4.4). Only fails if every attempt errors,
    /// which in practice means the chain itself was empty — the
    /// synthetic fallback never errors.
    pub async fn embed_multi_sector(
        &self,
        store: &dyn Store,
        id: &str,
        text: &str,
        sectors: &[Sector],
    ) -> OmResult<Vec<(Sector, Vec<f32>)>> {
        let model = self.chain.active_provider_name().to_string();
        let mut log = EmbedLog::pending(id.to_string(), model);
        store.insert_embed_log(&log).await?;

        let mut last_err = None;
        for (attempt, delay_secs) in MULTI_SECTOR_BACKOFF.iter().enumerate().take(MULTI_SECTOR_MAX_ATTEMPTS as usize) {
            match self.embed_query_all_sectors(text, sectors).await {
                Ok(result) => {
                    log.complete();
                    store.update_embed_log(&log).await?;
                    return Ok(result);
                }
                Err(e) => {
                    warn!(attempt = attempt + 1, error = %e, "embed_multi_sector attempt failed");
                    last_err = Some(e);
                    if attempt + 1 < MULTI_SECTOR_MAX_ATTEMPTS as usize {
                        tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                    }
                }
            }
        }

        let err = last_err.unwrap_or_else(|| OmError::Internal("embed_multi_sector exhausted retries".into()));
        log.fail(err.to_string());
        store.update_embed_log(&log).await?;
        Err(err)
    }

    pub fn active_provider(&self) -> &str {
        self.chain.active_provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_engine() -> EmbeddingEngine {
        EmbeddingEngine::new(EmbeddingConfig { vec_dim: 64, ..Default::default() })
    }

    #[tokio::test]
    async fn embed_for_sector_returns_configured_dims() {
        let engine = synthetic_engine();
        let v = engine.embed_for_sector("hello world", Sector::Semantic).await.unwrap();
        assert_eq!(v.len(), 64);
    }

    #[tokio::test]
    async fn embed_for_sector_is_cached() {
        let engine = synthetic_engine();
        let a = engine.embed_for_sector("cached text", Sector::Episodic).await.unwrap();
        let b = engine.embed_for_sector("cached text", Sector::Episodic).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn embed_query_all_sectors_covers_every_sector() {
        let engine = synthetic_engine();
        let sectors = [Sector::Episodic, Sector::Semantic, Sector::Procedural];
        let out = engine.embed_query_all_sectors("multi sector text", &sectors).await.unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|(_, v)| v.len() == 64));
    }

    #[tokio::test]
    async fn different_sectors_yield_different_vectors() {
        let engine = synthetic_engine();
        let a = engine.embed_for_sector("the quick brown fox", Sector::Episodic).await.unwrap();
        let b = engine.embed_for_sector("the quick brown fox", Sector::Procedural).await.unwrap();
        assert_ne!(a, b);
    }
}
