//! Waypoint prune (§4.7): deletes waypoint edges whose weight has decayed
//! below a floor, so the spreading-activation neighbor lookup doesn't keep
//! scanning edges that contribute negligible energy.
use openmemory_core::errors::OmResult;
use openmemory_core::models::Stats;
use openmemory_core::traits::Store;
use tracing::debug;

pub async fn run(store: &dyn Store, threshold: f64) -> OmResult<usize> {
    let pruned = store.prune_waypoints(threshold).await?;
    store.record_stat(&Stats::new("waypoint_prune", pruned as i64)).await?;
    debug!(pruned, threshold, "waypoint prune complete");
    Ok(pruned)
}
