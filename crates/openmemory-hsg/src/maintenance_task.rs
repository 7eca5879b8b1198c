//! Always-on waypoint-maintenance background task (§4.6, 1 Hz):
//! drains coactivation pairs and reinforces the waypoint between them
//! based on how close together the two memories were last seen.

use std::time::Duration;

use openmemory_core::constants::{COACTIVATION_DRAIN_BATCH, WAYPOINT_MAX_WEIGHT};
use openmemory_core::models::Waypoint;
use openmemory_core::traits::Store;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::HsgEngine;

const DEFAULT_FLUSH_HZ: f64 = 1.0;

/// Spawns the loop on the current Tokio runtime; drop the returned handle
/// to detach it, or call `.abort()` to stop it. `flush_hz` comes from
/// `MaintenanceConfig::waypoint_flush_hz`; non-positive values fall back
/// to the 1 Hz default.
pub fn spawn(engine: HsgEngine, flush_hz: f64) -> JoinHandle<()> {
    let hz = if flush_hz > 0.0 { flush_hz } else { DEFAULT_FLUSH_HZ };
    let tick_interval = Duration::from_secs_f64(1.0 / hz);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(tick_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = tick(&engine).await {
                warn!(error = %e, "waypoint maintenance tick failed");
            }
        }
    })
}

async fn tick(engine: &HsgEngine) -> openmemory_core::errors::OmResult<()> {
    let pairs = engine.coactivation().drain_up_to(COACTIVATION_DRAIN_BATCH);
    if pairs.is_empty() {
        return Ok(());
    }

    let store = engine.store();
    let dynamics = engine.dynamics().config().clone();
    let tau_hours = dynamics.waypoint_tau_hours.max(f64::EPSILON);

    for (a, b, user_id) in pairs {
        let user_id = user_id.as_deref();
        let (mem_a, mem_b) = match (store.get_memory(&a, user_id).await?, store.get_memory(&b, user_id).await?) {
            (Some(ma), Some(mb)) => (ma, mb),
            _ => continue,
        };
        if mem_a.tenant_key() != mem_b.tenant_key() {
            continue;
        }

        let delta_hours = (mem_a.last_seen_at - mem_b.last_seen_at).num_milliseconds().abs() as f64 / 3_600_000.0;
        let temporal_factor = (-delta_hours / tau_hours).exp();

        let existing = store
            .get_waypoints_by_src(&a, user_id)
            .await?
            .into_iter()
            .find(|w| w.dst_id == b)
            .map(|w| w.clamped_weight())
            .unwrap_or(0.0);

        let new_weight = (existing + dynamics.waypoint_eta * (1.0 - existing) * temporal_factor).min(WAYPOINT_MAX_WEIGHT);

        if existing > 0.0 {
            store.update_waypoint_weight(&a, &b, user_id, new_weight).await?;
        } else {
            store.insert_waypoint(&Waypoint::new(a.clone(), b.clone(), user_id.map(str::to_string), new_weight)).await?;
        }

        debug!(src = %a, dst = %b, weight = new_weight, "waypoint reinforced by coactivation");
    }

    Ok(())
}
