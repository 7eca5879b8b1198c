use std::sync::Arc;

use openmemory_core::config::{DynamicsConfig, EmbeddingConfig, OpsConfig, RetrievalConfig};
use openmemory_core::errors::OmError;
use openmemory_dynamics::DynamicsEngine;
use openmemory_embeddings::EmbeddingEngine;
use openmemory_hsg::{HsgEngine, QueryFilters};
use openmemory_ops::OpsFacade;
use openmemory_storage::{SqliteStore, StorageBackend};

fn test_facade(max_active: usize) -> OpsFacade {
    let backend = Arc::new(StorageBackend::Sqlite(SqliteStore::open_in_memory().unwrap()));
    let embeddings = Arc::new(EmbeddingEngine::new(EmbeddingConfig { vec_dim: 32, ..Default::default() }));
    let dynamics = DynamicsEngine::new(DynamicsConfig::default(), RetrievalConfig::default());
    let engine = HsgEngine::new(backend, embeddings, dynamics, RetrievalConfig::default());
    OpsFacade::new(engine, OpsConfig { max_active, ..Default::default() })
}

#[tokio::test]
async fn add_then_query_round_trips_through_the_facade() {
    let facade = test_facade(4);
    let added = facade
        .add("a fact about the ops facade", Some("tenant-a"), vec!["facade".into()], serde_json::json!({}))
        .await
        .unwrap();

    let mut filters = QueryFilters::default();
    filters.user_id = Some("tenant-a".to_string());
    let results = facade.query("ops facade", 5, filters).await.unwrap();
    assert!(results.iter().any(|r| r.id == added.id));
}

#[tokio::test]
async fn add_rejects_empty_content() {
    let facade = test_facade(4);
    let err = facade.add("", Some("tenant-a"), vec![], serde_json::json!({})).await.unwrap_err();
    assert!(matches!(err, OmError::Validation(_)));
}

#[tokio::test]
async fn query_concurrency_budget_rejects_past_max_active() {
    let facade = test_facade(1);
    let _permit = facade.try_reserve_query_slot_for_test().unwrap();
    let mut filters = QueryFilters::default();
    filters.user_id = Some("tenant-a".to_string());
    let err = facade.query("anything", 3, filters).await.unwrap_err();
    assert!(matches!(err, OmError::BudgetExceeded { max_active: 1 }));
}

#[tokio::test]
async fn get_user_summary_reflects_added_memories() {
    let facade = test_facade(4);
    facade.add("first memory", Some("tenant-b"), vec![], serde_json::json!({})).await.unwrap();
    facade.add("second memory", Some("tenant-b"), vec![], serde_json::json!({})).await.unwrap();

    let summary = facade.get_user_summary("tenant-b").await.unwrap();
    assert_eq!(summary.memory_count, 2);
}

#[tokio::test]
async fn get_stats_reports_reinforce_consolidation_events() {
    let facade = test_facade(4);
    let added = facade.add("a fact worth reinforcing", Some("tenant-c"), vec![], serde_json::json!({})).await.unwrap();
    facade.reinforce(&added.id, 0.9, Some("tenant-c")).await.unwrap();

    let report = facade.get_stats(Some("consolidate"), 10).await.unwrap();
    assert!(!report.entries.is_empty());
}
