//! Schedules the maintenance jobs as independent periodic loops on the
//! current Tokio runtime, the same one-task-per-concern shape as the HSG
//! crate's waypoint-maintenance tick. Each job owns its own interval so a
//! slow orphan-prune pass never delays the decay scan.
use std::sync::Arc;
use std::time::Duration;

use openmemory_core::config::MaintenanceConfig;
use openmemory_dynamics::DynamicsEngine;
use openmemory_storage::StorageBackend;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::{decay_job, orphan_prune_job, waypoint_prune_job};

/// Waypoint prune isn't covered by `MaintenanceConfig` (it shares no
/// tuning surface with decay/orphan-prune); it runs once a day, the same
/// cadence the spec suggests for maintenance in general.
const WAYPOINT_PRUNE_INTERVAL: Duration = Duration::from_secs(86_400);

/// One handle per job; drop all of them (or call `.abort()`) to stop.
pub struct MaintenanceHandles {
    pub decay: JoinHandle<()>,
    pub orphan_prune: Option<JoinHandle<()>>,
    pub waypoint_prune: JoinHandle<()>,
}

pub fn spawn(backend: Arc<StorageBackend>, dynamics: DynamicsEngine, config: MaintenanceConfig) -> MaintenanceHandles {
    let decay = {
        let backend = Arc::clone(&backend);
        let dynamics = dynamics.clone();
        let interval = Duration::from_secs(config.decay_interval_minutes.max(1) * 60);
        let ratio = config.decay_ratio;
        let sleep = Duration::from_millis(config.decay_sleep_ms);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = decay_job::run(backend.store(), &dynamics, ratio, sleep).await {
                    warn!(error = %e, "decay scan failed");
                }
            }
        })
    };

    let orphan_prune = config.orphan_prune_enabled.then(|| {
        let backend = Arc::clone(&backend);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(WAYPOINT_PRUNE_INTERVAL);
            loop {
                ticker.tick().await;
                let vectors = backend.vector_store();
                if let Err(e) = orphan_prune_job::run(backend.store(), vectors.as_ref()).await {
                    warn!(error = %e, "orphan vector prune failed");
                }
            }
        })
    });

    let waypoint_prune = {
        let threshold = dynamics.config().waypoint_prune_threshold;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(WAYPOINT_PRUNE_INTERVAL);
            loop {
                ticker.tick().await;
                if let Err(e) = waypoint_prune_job::run(backend.store(), threshold).await {
                    warn!(error = %e, "waypoint prune failed");
                }
            }
        })
    };

    MaintenanceHandles { decay, orphan_prune, waypoint_prune }
}

/// Runs the jobs once, in sequence, for callers that want to trigger
/// maintenance from an external scheduler (cron, an orchestrator's job
/// queue) instead of the always-on loops above.
pub async fn run_once(
    backend: &StorageBackend,
    dynamics: &DynamicsEngine,
    config: &MaintenanceConfig,
) -> openmemory_core::errors::OmResult<MaintenanceRunSummary> {
    let decayed = decay_job::run(
        backend.store(),
        dynamics,
        config.decay_ratio,
        Duration::from_millis(config.decay_sleep_ms),
    )
    .await?;

    let orphans_deleted = if config.orphan_prune_enabled {
        let vectors = backend.vector_store();
        orphan_prune_job::run(backend.store(), vectors.as_ref()).await?
    } else {
        0
    };

    let waypoints_pruned = waypoint_prune_job::run(backend.store(), dynamics.config().waypoint_prune_threshold).await?;
    Ok(MaintenanceRunSummary { decayed, orphans_deleted, waypoints_pruned })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceRunSummary {
    pub decayed: usize,
    pub orphans_deleted: usize,
    pub waypoints_pruned: usize,
}
