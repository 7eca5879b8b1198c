use std::sync::Arc;

use openmemory_core::config::{DynamicsConfig, EmbeddingConfig, RetrievalConfig};
use openmemory_dynamics::DynamicsEngine;
use openmemory_embeddings::EmbeddingEngine;
use openmemory_hsg::{AddOverrides, HsgEngine, QueryFilters, UpdateFields};
use openmemory_storage::StorageBackend;
use openmemory_storage::SqliteStore;

fn test_engine() -> HsgEngine {
    let backend = Arc::new(StorageBackend::Sqlite(SqliteStore::open_in_memory().unwrap()));
    let embeddings = Arc::new(EmbeddingEngine::new(EmbeddingConfig { vec_dim: 32, ..Default::default() }));
    let dynamics = DynamicsEngine::new(DynamicsConfig::default(), RetrievalConfig::default());
    HsgEngine::new(backend, embeddings, dynamics, RetrievalConfig::default())
}

#[tokio::test]
async fn add_then_query_finds_the_memory() {
    let engine = test_engine();
    let added = engine
        .add(
            "I visited Paris last summer and loved the food",
            Some("tenant-a"),
            vec!["travel".into()],
            serde_json::json!({}),
            AddOverrides::default(),
        )
        .await
        .unwrap();

    let mut filters = QueryFilters::default();
    filters.user_id = Some("tenant-a".to_string());
    let results = engine.query("Paris trip", 5, filters).await.unwrap();

    assert!(results.iter().any(|r| r.id == added.id));
}

#[tokio::test]
async fn repeated_add_of_identical_content_is_idempotent() {
    let engine = test_engine();
    let first = engine
        .add("remember to water the plants", Some("tenant-a"), vec![], serde_json::json!({}), AddOverrides::default())
        .await
        .unwrap();
    let second = engine
        .add("remember to water the plants", Some("tenant-a"), vec![], serde_json::json!({}), AddOverrides::default())
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn delete_removes_memory_from_future_queries() {
    let engine = test_engine();
    let added = engine
        .add("an explicit fact about gRPC retries", Some("tenant-a"), vec![], serde_json::json!({}), AddOverrides::default())
        .await
        .unwrap();

    engine.delete(&added.id, Some("tenant-a")).await.unwrap();

    let mut filters = QueryFilters::default();
    filters.user_id = Some("tenant-a".to_string());
    let results = engine.query("gRPC retries", 10, filters).await.unwrap();
    assert!(!results.iter().any(|r| r.id == added.id));
}

#[tokio::test]
async fn update_changes_content_and_reembeds() {
    let engine = test_engine();
    let added = engine
        .add("first version of the note", Some("tenant-a"), vec![], serde_json::json!({}), AddOverrides::default())
        .await
        .unwrap();

    engine
        .update(
            &added.id,
            UpdateFields { content: Some("second version of the note".to_string()), tags: None, metadata: None },
            Some("tenant-a"),
        )
        .await
        .unwrap();

    let mut filters = QueryFilters::default();
    filters.user_id = Some("tenant-a".to_string());
    let results = engine.query("second version", 10, filters).await.unwrap();
    assert!(results.iter().any(|r| r.id == added.id));
}

#[tokio::test]
async fn reinforce_boosts_salience() {
    let engine = test_engine();
    let added = engine
        .add("a fact worth reinforcing", Some("tenant-a"), vec![], serde_json::json!({}), AddOverrides::default())
        .await
        .unwrap();

    engine.reinforce(&added.id, 0.9, Some("tenant-a")).await.unwrap();

    let memory = engine.get(&added.id, Some("tenant-a")).await.unwrap().unwrap();
    assert!(memory.salience.value() > 0.8);
}
