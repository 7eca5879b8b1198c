//! Orphan-vector prune (§4.7): the vector store and the metadata store are
//! written inside the same transaction on the happy path, but a crash
//! between the two leaves stray `(id, sector, user_id)` vectors with no
//! backing `Memory` row. This walks every stored vector key and deletes
//! the ones whose memory no longer exists.
use std::collections::HashSet;

use openmemory_core::constants::{ORPHAN_PRUNE_BATCH, ORPHAN_PRUNE_YIELD_EVERY};
use openmemory_core::errors::OmResult;
use openmemory_core::models::Stats;
use openmemory_core::traits::{Store, VectorStore};
use tracing::debug;

pub async fn run(store: &dyn Store, vectors: &dyn VectorStore) -> OmResult<usize> {
    let all_keys = vectors.iterate_all_ids().await?;
    let mut deleted = 0usize;
    let mut scanned = 0usize;

    for chunk in all_keys.chunks(ORPHAN_PRUNE_BATCH) {
        // A memory id is globally unique, so the first key seen for an id
        // carries its owning tenant.
        let mut live_ids = HashSet::new();
        let mut checked = HashSet::new();
        for (id, _, user_id) in chunk {
            if !checked.insert(id.clone()) {
                continue;
            }
            if store.get_memory(id, user_id.as_deref()).await?.is_some() {
                live_ids.insert(id.clone());
            }
        }

        let orphaned: Vec<_> = chunk.iter().filter(|(id, _, _)| !live_ids.contains(id)).cloned().collect();
        if !orphaned.is_empty() {
            deleted += vectors.delete_by_keys(&orphaned).await?;
        }

        scanned += chunk.len();
        if scanned % ORPHAN_PRUNE_YIELD_EVERY < ORPHAN_PRUNE_BATCH {
            tokio::task::yield_now().await;
        }
    }

    store.record_stat(&Stats::new("orphan_vector_prune", deleted as i64)).await?;
    debug!(deleted, scanned, "orphan vector prune complete");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use openmemory_core::memory::Sector;
    use openmemory_storage::{SqliteStore, StorageBackend};

    use super::*;

    #[tokio::test]
    async fn deletes_vectors_with_no_backing_memory() {
        let backend = Arc::new(StorageBackend::Sqlite(SqliteStore::open_in_memory().unwrap()));
        let store = backend.store();
        let vectors = backend.vector_store();

        vectors.store("orphan-1", Sector::Semantic, &[0.1, 0.2, 0.3], Some("tenant-a")).await.unwrap();

        let deleted = run(store, vectors.as_ref()).await.unwrap();
        assert_eq!(deleted, 1);

        let remaining = vectors.get_vector("orphan-1", Sector::Semantic, Some("tenant-a")).await.unwrap();
        assert!(remaining.is_none());
    }
}
