use openmemory_core::config::{DynamicsConfig, MaintenanceConfig, RetrievalConfig};
use openmemory_core::memory::{Memory, Salience, Sector};
use openmemory_dynamics::DynamicsEngine;
use openmemory_maintenance::run_once;
use openmemory_storage::{SqliteStore, StorageBackend};

#[tokio::test]
async fn run_once_decays_stale_memories_and_prunes_orphans() {
    let backend = StorageBackend::Sqlite(SqliteStore::open_in_memory().unwrap());
    let dynamics = DynamicsEngine::new(DynamicsConfig::default(), RetrievalConfig::default());

    let mut stale = Memory::new(
        "mem-stale".into(),
        Some("tenant-a".into()),
        "an old note".into(),
        "simhash-stale".into(),
        Sector::Semantic,
        vec![],
        serde_json::json!({}),
        vec![0.2; 4],
        0.015,
    );
    stale.salience = Salience::new(0.9);
    stale.last_seen_at = chrono::Utc::now() - chrono::Duration::days(120);
    backend.store().insert_memory(&stale).await.unwrap();

    backend
        .vector_store()
        .store("orphan-vec", Sector::Semantic, &[0.1, 0.2], Some("tenant-a"))
        .await
        .unwrap();

    let config = MaintenanceConfig { decay_ratio: 1.0, decay_sleep_ms: 0, ..Default::default() };
    let summary = run_once(&backend, &dynamics, &config).await.unwrap();
    assert_eq!(summary.decayed, 1);
    assert_eq!(summary.orphans_deleted, 1);

    let refreshed = backend.store().get_memory("mem-stale", Some("tenant-a")).await.unwrap().unwrap();
    assert!(refreshed.salience.value() < 0.9);
}
