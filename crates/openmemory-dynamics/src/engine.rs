use chrono::{DateTime, Utc};
use openmemory_core::config::{DynamicsConfig, RetrievalConfig};
use openmemory_core::memory::Sector;

use crate::decay::dual_phase_decay_with;
use crate::recency::recency;
use crate::reinforcement::{propagate_with, retrieval_reinforcement_with};
use crate::resonance::cross_sector_resonance;
use crate::sigmoid::{boost, sigmoid};
use crate::spreading::{spreading_activation, SpreadingActivationResult};

/// Config-bound facade over the dynamics formulas, mirroring the shape of a
/// storage/embedding "engine" struct elsewhere in the workspace: construct
/// once from config, call stateless methods per memory/query.
#[derive(Debug, Clone)]
pub struct DynamicsEngine {
    dynamics: DynamicsConfig,
    retrieval: RetrievalConfig,
}

impl DynamicsEngine {
    pub fn new(dynamics: DynamicsConfig, retrieval: RetrievalConfig) -> Self {
        Self { dynamics, retrieval }
    }

    pub fn config(&self) -> &DynamicsConfig {
        &self.dynamics
    }

    pub fn retrieval_config(&self) -> &RetrievalConfig {
        &self.retrieval
    }

    /// Current effective salience given the stored salience and elapsed
    /// time since last access.
    pub fn decay(&self, salience: f64, last_seen: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let delta_days = (now - last_seen).num_milliseconds().max(0) as f64 / 86_400_000.0;
        dual_phase_decay_with(
            salience,
            delta_days,
            self.dynamics.lambda_fast,
            self.dynamics.lambda_slow,
            self.dynamics.theta,
        )
    }

    pub fn recency(&self, last_seen: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        recency(last_seen, now, self.dynamics.recency_tau_days, self.dynamics.recency_max_days)
    }

    pub fn resonance(&self, memory_sector: Sector, query_sector: Sector) -> f64 {
        cross_sector_resonance(memory_sector, query_sector)
    }

    pub fn reinforce(&self, salience: f64) -> f64 {
        retrieval_reinforcement_with(salience, self.dynamics.eta_reinforcement)
    }

    pub fn propagate(&self, neighbor_salience: f64, edge_weight: f64, source_salience: f64) -> f64 {
        propagate_with(neighbor_salience, edge_weight, source_salience, self.dynamics.eta_reinforcement)
    }

    /// Combined relevance score from the per-factor components, as used by
    /// the retrieval orchestrator to rank candidates before spreading
    /// activation reorders the top set.
    #[allow(clippy::too_many_arguments)]
    pub fn combined_score(
        &self,
        similarity: f64,
        token_overlap: f64,
        waypoint_strength: f64,
        recency: f64,
        tag_match: f64,
    ) -> f64 {
        let boosted_sim = boost(similarity.max(0.0), openmemory_core::constants::SIM_BOOST_TAU);
        let raw = self.retrieval.w_sim * boosted_sim
            + self.retrieval.w_overlap * token_overlap
            + self.retrieval.w_waypoint * waypoint_strength
            + self.retrieval.w_recency * recency
            + self.retrieval.w_tag * tag_match;
        sigmoid(raw * 2.0 - 1.0)
    }

    pub fn spread<F>(&self, seeds: &[(String, f64)], max_hops: usize, neighbors: F) -> SpreadingActivationResult
    where
        F: Fn(&str) -> Vec<(String, f64)>,
    {
        spreading_activation(seeds, max_hops, neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_score_rewards_similarity() {
        let engine = DynamicsEngine::new(DynamicsConfig::default(), RetrievalConfig::default());
        let high = engine.combined_score(0.9, 0.0, 0.0, 0.0, 0.0);
        let low = engine.combined_score(0.1, 0.0, 0.0, 0.0, 0.0);
        assert!(high > low);
    }

    #[test]
    fn decay_uses_configured_lambdas() {
        let engine = DynamicsEngine::new(DynamicsConfig::default(), RetrievalConfig::default());
        let now = Utc::now();
        let decayed = engine.decay(1.0, now - chrono::Duration::days(30), now);
        assert!(decayed > 0.0 && decayed < 1.0);
    }
}
