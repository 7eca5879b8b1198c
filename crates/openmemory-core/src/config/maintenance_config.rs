use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub decay_interval_minutes: u64,
    /// Fraction of eligible memories processed per decay pass (1.0 = all).
    pub decay_ratio: f64,
    /// Sleep between chunks, to yield the scheduler under load.
    pub decay_sleep_ms: u64,
    pub waypoint_flush_hz: f64,
    pub orphan_prune_enabled: bool,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            decay_interval_minutes: defaults::DEFAULT_DECAY_INTERVAL_MINUTES,
            decay_ratio: defaults::DEFAULT_DECAY_RATIO,
            decay_sleep_ms: defaults::DEFAULT_DECAY_SLEEP_MS,
            waypoint_flush_hz: 1.0,
            orphan_prune_enabled: true,
        }
    }
}
