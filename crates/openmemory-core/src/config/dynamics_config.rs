use serde::{Deserialize, Serialize};

use crate::constants;

/// Decay/reinforcement/spreading-activation tunables. Mirrors §6's
/// dynamics constants but allows per-deployment overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    pub lambda_fast: f64,
    pub lambda_slow: f64,
    pub theta: f64,
    pub eta_reinforcement: f64,
    pub gamma_spread: f64,
    pub recency_tau_days: f64,
    pub recency_max_days: f64,
    pub spread_max_iterations: usize,
    pub waypoint_eta: f64,
    pub waypoint_tau_hours: f64,
    pub waypoint_prune_threshold: f64,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            lambda_fast: constants::LAMBDA_FAST,
            lambda_slow: constants::LAMBDA_SLOW,
            theta: constants::DECAY_THETA,
            eta_reinforcement: constants::ETA_REINFORCEMENT,
            gamma_spread: constants::GAMMA_SPREAD,
            recency_tau_days: constants::RECENCY_TAU_DAYS,
            recency_max_days: constants::RECENCY_MAX_DAYS,
            spread_max_iterations: 4,
            waypoint_eta: constants::WAYPOINT_ETA,
            waypoint_tau_hours: constants::WAYPOINT_TAU_HOURS_DEFAULT,
            waypoint_prune_threshold: constants::WAYPOINT_PRUNE_THRESHOLD_DEFAULT,
        }
    }
}
