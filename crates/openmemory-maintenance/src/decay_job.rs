//! Dual-phase decay scan (§4.7): walks every memory in `created_at, id`
//! cursor order and reapplies `DynamicsEngine::decay` against elapsed time
//! since `last_seen_at`. Writes are skipped below a noise floor so a
//! memory that was just reinforced doesn't get rewritten on the same pass
//! it was touched — this is what keeps a tenant with a hot working set
//! from generating a write per memory per tick.
use std::time::Duration;

use chrono::Utc;
use openmemory_core::constants::DECAY_SCAN_CHUNK;
use openmemory_core::errors::OmResult;
use openmemory_core::memory::Salience;
use openmemory_core::models::Stats;
use openmemory_core::traits::Store;
use openmemory_dynamics::DynamicsEngine;
use tracing::debug;

/// Minimum absolute salience change worth persisting.
const DECAY_WRITE_THRESHOLD: f64 = 0.001;

/// Runs one decay pass over every tenant's memories, in `created_at, id`
/// cursor order. `ratio` (from `MaintenanceConfig::decay_ratio`) caps the
/// pass at that fraction of the total population, so a deployment with a
/// huge backlog can spread a full sweep over several scheduled ticks
/// instead of stalling on one. `sleep` is awaited between chunks to give
/// the scheduler a chance to run other work. Returns the number of rows
/// actually rewritten.
pub async fn run(store: &dyn Store, dynamics: &DynamicsEngine, ratio: f64, sleep: Duration) -> OmResult<usize> {
    let total = store.count_memories(None).await?;
    let budget = ((total as f64) * ratio.clamp(0.0, 1.0)).ceil() as usize;

    let mut cursor = None;
    let mut rewritten = 0usize;
    let mut scanned = 0usize;
    let now = Utc::now();

    loop {
        let batch = store.list_memories(None, None, cursor.clone(), DECAY_SCAN_CHUNK).await?;
        if batch.is_empty() {
            break;
        }
        let reached_end = batch.len() < DECAY_SCAN_CHUNK;
        cursor = batch.last().map(|m| (m.created_at, m.id.clone()));

        for memory in &batch {
            if scanned >= budget {
                break;
            }
            scanned += 1;
            let decayed = dynamics.decay(memory.salience.value(), memory.last_seen_at, now);
            if (decayed - memory.salience.value()).abs() <= DECAY_WRITE_THRESHOLD {
                continue;
            }
            store
                .update_last_seen_and_salience(
                    &memory.id,
                    memory.user_id.as_deref(),
                    memory.last_seen_at,
                    Salience::new(decayed),
                )
                .await?;
            rewritten += 1;
        }

        if reached_end || scanned >= budget {
            break;
        }
        if !sleep.is_zero() {
            tokio::time::sleep(sleep).await;
        }
    }

    store.record_stat(&Stats::new("decay_scan", rewritten as i64)).await?;
    debug!(rewritten, scanned, total, "decay scan complete");
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use openmemory_core::config::{DynamicsConfig, RetrievalConfig};
    use openmemory_core::memory::{Memory, Sector};
    use openmemory_storage::{SqliteStore, StorageBackend};

    use super::*;

    #[tokio::test]
    async fn decay_scan_lowers_salience_of_stale_memory() {
        let backend = Arc::new(StorageBackend::Sqlite(SqliteStore::open_in_memory().unwrap()));
        let store = backend.store();
        let dynamics = DynamicsEngine::new(DynamicsConfig::default(), RetrievalConfig::default());

        let stale_seen = Utc::now() - chrono::Duration::days(90);
        let mut memory = Memory::new(
            "mem-1".into(),
            Some("tenant-a".into()),
            "an old fact".into(),
            "simhash-1".into(),
            Sector::Semantic,
            vec![],
            serde_json::json!({}),
            vec![0.1; 4],
            0.015,
        );
        memory.salience = Salience::new(0.9);
        memory.last_seen_at = stale_seen;
        store.insert_memory(&memory).await.unwrap();

        let rewritten = run(store, &dynamics, 1.0, Duration::ZERO).await.unwrap();
        assert_eq!(rewritten, 1);

        let refreshed = store.get_memory("mem-1", Some("tenant-a")).await.unwrap().unwrap();
        assert!(refreshed.salience.value() < 0.9);
    }

    #[tokio::test]
    async fn fresh_memory_is_not_rewritten() {
        let backend = Arc::new(StorageBackend::Sqlite(SqliteStore::open_in_memory().unwrap()));
        let store = backend.store();
        let dynamics = DynamicsEngine::new(DynamicsConfig::default(), RetrievalConfig::default());

        let mut memory = Memory::new(
            "mem-2".into(),
            Some("tenant-a".into()),
            "a fresh fact".into(),
            "simhash-2".into(),
            Sector::Semantic,
            vec![],
            serde_json::json!({}),
            vec![0.1; 4],
            0.015,
        );
        memory.salience = Salience::new(0.9);
        store.insert_memory(&memory).await.unwrap();

        let rewritten = run(store, &dynamics, 1.0, Duration::ZERO).await.unwrap();
        assert_eq!(rewritten, 0);
    }
}
