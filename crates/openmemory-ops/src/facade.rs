//! `OpsFacade`: the only public API of the core (§4.8). Validates input,
//! attaches tenant context, bounds query concurrency, and never lets a
//! caller see a `Store`, a `VectorStore`, or SQL.
use std::sync::Arc;

use openmemory_core::config::OpsConfig;
use openmemory_core::errors::{OmError, OmResult};
use openmemory_core::models::User;
use openmemory_core::traits::Store;
use openmemory_hsg::{AddOverrides, AddResult, HsgEngine, QueryFilters, RankedMemory, UpdateFields};
use tokio::sync::Semaphore;
use tracing::instrument;

use crate::types::{AddBatchItem, StatsEntry, StatsReport, UserSummary};
use crate::validation;

pub struct OpsFacade {
    engine: HsgEngine,
    config: OpsConfig,
    query_budget: Arc<Semaphore>,
}

impl OpsFacade {
    pub fn new(engine: HsgEngine, config: OpsConfig) -> Self {
        let query_budget = Arc::new(Semaphore::new(config.max_active.max(1)));
        Self { engine, config, query_budget }
    }

    #[instrument(skip(self, content, meta))]
    pub async fn add(
        &self,
        content: &str,
        user_id: Option<&str>,
        tags: Vec<String>,
        meta: serde_json::Value,
    ) -> OmResult<AddResult> {
        validation::validate_content(content)?;
        validation::validate_tags(&tags)?;
        validation::validate_metadata(&meta)?;
        self.touch_user(user_id).await?;
        self.engine.add(content, user_id, tags, meta, AddOverrides::default()).await
    }

    /// Adds every item independently; a failure on one item doesn't abort
    /// the rest. Caller gets a result per item, in request order.
    #[instrument(skip(self, items))]
    pub async fn add_batch(&self, items: Vec<AddBatchItem>, user_id: Option<&str>) -> OmResult<Vec<OmResult<AddResult>>> {
        if items.len() > openmemory_core::constants::MAX_BULK_BATCH_SIZE {
            return Err(OmError::validation(format!(
                "batch exceeds {} items",
                openmemory_core::constants::MAX_BULK_BATCH_SIZE
            )));
        }
        self.touch_user(user_id).await?;
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            results.push(self.add(&item.content, user_id, item.tags, item.meta).await);
        }
        Ok(results)
    }

    #[instrument(skip(self, text, filters))]
    pub async fn query(&self, text: &str, k: usize, filters: QueryFilters) -> OmResult<Vec<RankedMemory>> {
        validation::validate_top_k(k)?;
        let _permit = self.query_budget.clone().try_acquire_owned().map_err(|_| OmError::BudgetExceeded {
            max_active: self.config.max_active,
        })?;
        self.engine.query(text, k, filters).await
    }

    #[instrument(skip(self, fields))]
    pub async fn update(&self, id: &str, fields: UpdateFields, user_id: Option<&str>) -> OmResult<()> {
        validation::validate_id(id)?;
        if let Some(content) = &fields.content {
            validation::validate_content(content)?;
        }
        if let Some(tags) = &fields.tags {
            validation::validate_tags(tags)?;
        }
        if let Some(meta) = &fields.metadata {
            validation::validate_metadata(meta)?;
        }
        self.engine.update(id, fields, user_id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str, user_id: Option<&str>) -> OmResult<()> {
        validation::validate_id(id)?;
        self.engine.delete(id, user_id).await
    }

    #[instrument(skip(self))]
    pub async fn reinforce(&self, id: &str, boost: f64, user_id: Option<&str>) -> OmResult<()> {
        validation::validate_id(id)?;
        validation::validate_boost(boost)?;
        self.engine.reinforce(id, boost, user_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_user_summary(&self, user_id: &str) -> OmResult<UserSummary> {
        validation::validate_id(user_id)?;
        let store = self.engine.backend().store();
        let user = store.get_user(user_id).await?.unwrap_or_else(|| User::new(user_id.to_string()));
        let memory_count = store.count_memories(Some(user_id)).await?;
        Ok(UserSummary {
            user_id: user.user_id,
            summary: user.summary,
            reflection_count: user.reflection_count,
            memory_count,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_stats(&self, event_type: Option<&str>, limit: usize) -> OmResult<StatsReport> {
        let store = self.engine.backend().store();
        let entries = store
            .list_stats(event_type, limit)
            .await?
            .into_iter()
            .map(|s| StatsEntry { event_type: s.event_type, count: s.count, ts: s.ts })
            .collect();
        Ok(StatsReport { event_type: event_type.map(str::to_string), entries })
    }

    /// Test-only escape hatch for exercising the `max_active` gate:
    /// reserves a query slot without running a query, so a test can hold
    /// it and assert the next real `query()` call is rejected.
    #[doc(hidden)]
    pub fn try_reserve_query_slot_for_test(&self) -> Option<tokio::sync::OwnedSemaphorePermit> {
        self.query_budget.clone().try_acquire_owned().ok()
    }

    /// First-touch: ensures a `User` row exists before the first memory
    /// lands, so `get_user_summary` never has to special-case "never
    /// added anything yet" for a tenant that has.
    async fn touch_user(&self, user_id: Option<&str>) -> OmResult<()> {
        let Some(user_id) = user_id else { return Ok(()) };
        let store = self.engine.backend().store();
        if store.get_user(user_id).await?.is_none() {
            store.upsert_user(&User::new(user_id.to_string())).await?;
        }
        Ok(())
    }
}
