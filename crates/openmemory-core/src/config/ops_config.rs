use serde::{Deserialize, Serialize};

use super::defaults;

/// Ops-facade-level knobs (§4.8, §6). `lg_*` is an optional
/// external-orchestrator namespace/context cap the facade forwards
/// verbatim without interpreting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsConfig {
    pub max_active: usize,
    pub lg_namespace_cap: Option<usize>,
    pub encryption_enabled: bool,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            max_active: defaults::DEFAULT_MAX_ACTIVE,
            lg_namespace_cap: None,
            encryption_enabled: false,
        }
    }
}
