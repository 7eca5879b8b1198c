use serde::{Deserialize, Serialize};

use super::defaults;

/// Scoring-weight overrides for the combined-score formula in HSG::query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub w_sim: f64,
    pub w_overlap: f64,
    pub w_waypoint: f64,
    pub w_recency: f64,
    pub w_tag: f64,
    pub keyword_boost: f64,
    /// Multiplier on `k` for per-sector candidate gathering (§4.6 step 5).
    pub candidate_fanout: usize,
    pub spreading_activation_enabled: bool,
    pub spreading_activation_weight: f64,
    pub query_cache_ttl_secs: u64,
    pub query_cache_size: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            w_sim: crate::constants::W_SIM,
            w_overlap: crate::constants::W_OVERLAP,
            w_waypoint: crate::constants::W_WAYPOINT,
            w_recency: crate::constants::W_RECENCY,
            w_tag: crate::constants::W_TAG,
            keyword_boost: defaults::DEFAULT_KEYWORD_BOOST,
            candidate_fanout: 3,
            spreading_activation_enabled: true,
            spreading_activation_weight: 0.3,
            query_cache_ttl_secs: 60,
            query_cache_size: 1_000,
        }
    }
}
