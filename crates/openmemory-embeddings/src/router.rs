//! Routes sectors to specific models per a configured mapping table, and
//! caches routing decisions with a TTL so repeated lookups for the same
//! sector skip the config-table scan (§4.4).

use std::time::Duration;

use moka::sync::Cache;
use openmemory_core::config::EmbeddingConfig;
use openmemory_core::memory::Sector;

const ROUTE_CACHE_TTL: Duration = Duration::from_secs(60);

pub struct Router {
    sector_models: Vec<(String, String)>,
    decisions: Cache<String, String>,
}

impl Router {
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let sector_models = config.router_sector_models.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Self { sector_models, decisions: Cache::builder().max_capacity(64).time_to_live(ROUTE_CACHE_TTL).build() }
    }

    /// The model name configured for `sector`, or `None` when unmapped
    /// (caller falls back to the chain's default provider/model).
    pub fn route(&self, sector: Sector) -> Option<String> {
        let key = sector.as_str().to_string();
        if let Some(cached) = self.decisions.get(&key) {
            return Some(cached);
        }
        let model = self.sector_models.iter().find(|(s, _)| s == sector.as_str()).map(|(_, m)| m.clone())?;
        self.decisions.insert(key, model.clone());
        Some(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn routes_mapped_sector_to_configured_model() {
        let mut map = HashMap::new();
        map.insert("procedural".to_string(), "code-embed-v2".to_string());
        let config = EmbeddingConfig { router_sector_models: map, ..Default::default() };
        let router = Router::from_config(&config);
        assert_eq!(router.route(Sector::Procedural), Some("code-embed-v2".to_string()));
    }

    #[test]
    fn unmapped_sector_returns_none() {
        let router = Router::from_config(&EmbeddingConfig::default());
        assert_eq!(router.route(Sector::Episodic), None);
    }

    #[test]
    fn repeated_route_hits_cache() {
        let mut map = HashMap::new();
        map.insert("semantic".to_string(), "text-embed".to_string());
        let config = EmbeddingConfig { router_sector_models: map, ..Default::default() };
        let router = Router::from_config(&config);
        assert_eq!(router.route(Sector::Semantic), router.route(Sector::Semantic));
    }
}
