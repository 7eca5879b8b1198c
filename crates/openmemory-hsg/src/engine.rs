//! `HsgEngine`: implements the Hierarchical Storage Graph orchestrator
//! (`add`/`query`/`update`/`delete`/`reinforce`, §4.6).
//!
//! Stage 1 (query): classify → batch-embed per searched sector → per-sector
//! ANN candidate gathering → ID union.
//! Stage 2 (query): hydrate candidates → multi-factor scoring → optional
//! spreading-activation reorder → top-k → reinforcement + coactivation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use openmemory_classifier::PatternClassifier;
use openmemory_core::config::{DynamicsConfig, RetrievalConfig};
use openmemory_core::errors::{OmError, OmResult};
use openmemory_core::memory::base::{canonical_tokens, simhash64_hex};
use openmemory_core::memory::{Salience, Sector};
use openmemory_core::models::{Stats, Waypoint};
use openmemory_core::traits::{Classifier, Store};
use openmemory_dynamics::DynamicsEngine;
use openmemory_embeddings::EmbeddingEngine;
use openmemory_storage::StorageBackend;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::coactivation::CoactivationBuffer;
use crate::query_cache::QueryCache;
use crate::scoring;
use crate::types::{AddOverrides, AddResult, HsgEvent, QueryFilters, RankedMemory, UpdateFields};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default per-memory decay rate; `Memory::decay_lambda` is a per-row
/// override point the HSG never exercises today, so every insert gets the
/// configured fast-phase lambda.
fn default_decay_lambda(dynamics: &DynamicsConfig) -> f64 {
    dynamics.lambda_fast
}

/// Subset match: every key/value in `filter` must be present and equal in
/// `meta`. Non-object filters fall back to direct equality.
fn metadata_matches(filter: &serde_json::Value, meta: &serde_json::Value) -> bool {
    match filter.as_object() {
        Some(filter_obj) => filter_obj.iter().all(|(k, v)| meta.get(k) == Some(v)),
        None => filter == meta,
    }
}

#[derive(Clone)]
pub struct HsgEngine {
    backend: Arc<StorageBackend>,
    embeddings: Arc<EmbeddingEngine>,
    classifier: PatternClassifier,
    dynamics: DynamicsEngine,
    retrieval_config: RetrievalConfig,
    coactivation: Arc<CoactivationBuffer>,
    query_cache: QueryCache,
    events: broadcast::Sender<HsgEvent>,
}

impl HsgEngine {
    pub fn new(
        backend: Arc<StorageBackend>,
        embeddings: Arc<EmbeddingEngine>,
        dynamics: DynamicsEngine,
        retrieval_config: RetrievalConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let query_cache = QueryCache::new(&retrieval_config);
        Self {
            backend,
            embeddings,
            classifier: PatternClassifier::new(),
            dynamics,
            retrieval_config,
            coactivation: Arc::new(CoactivationBuffer::new()),
            query_cache,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HsgEvent> {
        self.events.subscribe()
    }

    /// Shared with the waypoint-maintenance background task.
    pub fn coactivation(&self) -> Arc<CoactivationBuffer> {
        self.coactivation.clone()
    }

    pub fn dynamics(&self) -> &DynamicsEngine {
        &self.dynamics
    }

    pub(crate) fn store(&self) -> &dyn Store {
        self.backend.store()
    }

    /// Exposes the underlying storage backend to same-workspace facades
    /// (the ops crate's `get_user_summary`/`get_stats`) that need store
    /// access the `add`/`query`/`update`/`delete`/`reinforce` surface
    /// doesn't cover.
    pub fn backend(&self) -> &Arc<StorageBackend> {
        &self.backend
    }

    fn emit(&self, event: HsgEvent) {
        let _ = self.events.send(event);
    }

    // --- add -----------------------------------------------------------

    pub async fn add(
        &self,
        content: &str,
        user_id: Option<&str>,
        tags: Vec<String>,
        meta: serde_json::Value,
        overrides: AddOverrides,
    ) -> OmResult<AddResult> {
        let simhash = simhash64_hex(content);

        if overrides.id.is_none() {
            if let Some(existing) = self.store().get_memory_by_simhash(&simhash, user_id).await? {
                if existing.content == content {
                    let boosted = existing.salience.boosted(0.1);
                    self.store()
                        .update_last_seen_and_salience(&existing.id, user_id, Utc::now(), boosted)
                        .await?;
                    return Ok(AddResult {
                        id: existing.id,
                        primary_sector: existing.primary_sector,
                        sectors: vec![existing.primary_sector],
                        chunks: 1,
                        content: existing.content,
                        created_at: existing.created_at,
                        user_id: existing.user_id,
                    });
                }
                // simhash collision with different content: proceed as new.
            }
        }

        let classification = match overrides.sector {
            Some(s) => openmemory_core::models::Classification::single(s, 1.0),
            None => self.classifier.classify(content, None),
        };
        let sectors = classification.all_sectors();

        let id = overrides.id.clone().unwrap_or_else(openmemory_core::ids::new_id);
        let vectors = self.embeddings.embed_query_all_sectors(content, &sectors).await?;
        let mean_vec = vectors
            .iter()
            .find(|(s, _)| *s == classification.primary)
            .map(|(_, v)| v.clone())
            .unwrap_or_default();

        let memory = openmemory_core::memory::Memory::new(
            id.clone(),
            user_id.map(str::to_string),
            content.to_string(),
            simhash,
            classification.primary,
            tags,
            meta,
            mean_vec,
            default_decay_lambda(self.dynamics.config()),
        );

        let tx = self.store().begin().await?;
        let result: OmResult<()> = async {
            self.store().insert_memory(&memory).await?;
            for (sector, vec) in &vectors {
                self.backend.vector_store().store(&id, *sector, vec, user_id).await?;
            }
            for additional in &classification.additional {
                let shadow = format!("{id}:{additional}");
                self.store()
                    .insert_waypoint(&Waypoint::new(id.clone(), shadow.clone(), user_id.map(str::to_string), 0.5))
                    .await?;
                self.store()
                    .insert_waypoint(&Waypoint::new(shadow, id.clone(), user_id.map(str::to_string), 0.5))
                    .await?;
            }
            Ok(())
        }
        .await;

        match result {
            Ok(()) => tx.commit().await?,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        }

        self.emit(HsgEvent::MemoryAdded {
            id: id.clone(),
            user_id: user_id.map(str::to_string),
            primary_sector: classification.primary,
        });

        Ok(AddResult {
            id,
            primary_sector: classification.primary,
            sectors,
            chunks: 1,
            content: content.to_string(),
            created_at: memory.created_at,
            user_id: user_id.map(str::to_string),
        })
    }

    // --- query -----------------------------------------------------------

    pub async fn query(&self, text: &str, k: usize, filters: QueryFilters) -> OmResult<Vec<RankedMemory>> {
        let cache_key = QueryCache::key(text, k, &filters);
        if let Some(cached) = self.query_cache.get(&cache_key) {
            return Ok(cached);
        }

        let user_id = filters.user_id.as_deref();
        let classification = self.classifier.classify(text, None);
        let query_tokens = canonical_tokens(text);

        let searched_sectors: Vec<Sector> = filters.sectors.clone().unwrap_or_else(|| Sector::ALL.to_vec());

        let query_vecs = match self.embeddings.embed_query_all_sectors(text, &searched_sectors).await {
            Ok(v) => v.into_iter().collect::<HashMap<_, _>>(),
            Err(e) => {
                warn!(error = %e, "query embedding failed for every provider, falling back to lexical scan");
                return self.lexical_fallback(text, k, &filters, &query_tokens).await;
            }
        };

        let fanout = k * self.retrieval_config.candidate_fanout;
        let mut best: HashMap<String, (f64, Sector)> = HashMap::new();
        for sector in &searched_sectors {
            let Some(qv) = query_vecs.get(sector) else { continue };
            let hits = self.backend.vector_store().search_similar(*sector, qv, fanout, user_id).await?;
            for hit in hits {
                best
                    .entry(hit.id)
                    .and_modify(|(score, s)| {
                        if hit.score > *score {
                            *score = hit.score;
                            *s = *sector;
                        }
                    })
                    .or_insert((hit.score, *sector));
            }
        }

        if best.is_empty() {
            let empty = Vec::new();
            self.query_cache.put(cache_key, empty.clone());
            return Ok(empty);
        }

        let ids: Vec<String> = best.keys().cloned().collect();
        let memories = self.store().get_memories_bulk(&ids, user_id).await?;

        let mut candidate_vecs: HashMap<String, HashMap<Sector, Vec<f32>>> = HashMap::new();
        let mut edges: HashMap<String, Vec<(String, f64)>> = HashMap::new();
        for id in &ids {
            let vecs = self.backend.vector_store().get_vectors_by_id(id, user_id).await?;
            candidate_vecs.insert(id.clone(), vecs.into_iter().collect());
            let neighbors = self.store().get_waypoints_by_src(id, user_id).await?;
            edges.insert(id.clone(), neighbors.into_iter().map(|w| (w.dst_id, w.clamped_weight())).collect());
        }

        let now = Utc::now();
        let mut scored: Vec<(RankedMemory, f64)> = Vec::new();
        for memory in &memories {
            if let Some(start) = filters.start_time {
                if memory.created_at < start {
                    continue;
                }
            }
            if let Some(end) = filters.end_time {
                if memory.created_at > end {
                    continue;
                }
            }
            if let Some(filter_meta) = &filters.metadata {
                if !metadata_matches(filter_meta, &memory.meta) {
                    continue;
                }
            }

            let decayed_salience = self.dynamics.decay(memory.salience.value(), memory.last_seen_at, now);
            if let Some(min_sal) = filters.min_salience {
                if decayed_salience < min_sal {
                    continue;
                }
            }

            let empty_vecs = HashMap::new();
            let cvecs = candidate_vecs.get(&memory.id).unwrap_or(&empty_vecs);
            let fusion = scoring::multi_vector_fusion_score(&query_vecs, cvecs);
            let resonance = self.dynamics.resonance(memory.primary_sector, classification.primary);
            let overlap = scoring::token_overlap(&query_tokens, &canonical_tokens(&memory.content));
            let recency = self.dynamics.recency(memory.last_seen_at, now);
            let tag_score = scoring::tag_match_score(&memory.tags, &query_tokens);
            let ww = scoring::waypoint_strength(&memory.id, &ids, &edges);

            let combined = self.dynamics.combined_score(fusion, overlap, ww, recency, tag_score);
            let final_score = combined * resonance;

            scored.push((
                RankedMemory {
                    id: memory.id.clone(),
                    content: memory.content.clone(),
                    primary_sector: memory.primary_sector,
                    tags: memory.tags.clone(),
                    salience: decayed_salience,
                    score: final_score,
                    last_seen_at: memory.last_seen_at,
                },
                final_score,
            ));
        }

        if self.retrieval_config.spreading_activation_enabled {
            let seeds: Vec<(String, f64)> = scored.iter().map(|(r, s)| (r.id.clone(), *s)).collect();
            let result = self.dynamics.spread(&seeds, self.dynamics.config().spread_max_iterations, |id| {
                edges.get(id).cloned().unwrap_or_default()
            });
            for (ranked, score) in scored.iter_mut() {
                let activation = result.activations.get(&ranked.id).copied().unwrap_or(0.0);
                *score += self.retrieval_config.spreading_activation_weight * activation;
                ranked.score = *score;
            }
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        let ranked: Vec<RankedMemory> = scored.into_iter().map(|(r, _)| r).collect();

        self.coactivation.push_coreturned(
            &ranked.iter().map(|r| r.id.clone()).collect::<Vec<_>>(),
            user_id.map(str::to_string),
        );

        for r in &ranked {
            let old_sal = Salience::new(r.salience);
            let new_sal = self.dynamics.reinforce(old_sal.value());
            self.store()
                .update_last_seen_and_salience(&r.id, user_id, now, Salience::new(new_sal))
                .await?;

            let delta = new_sal - old_sal.value();
            if delta.abs() <= f64::EPSILON {
                continue;
            }
            for (dst_id, weight) in edges.get(&r.id).cloned().unwrap_or_default() {
                if let Some(neighbor) = self.store().get_memory(&dst_id, user_id).await? {
                    let days = (now - neighbor.last_seen_at).num_milliseconds().abs() as f64 / 86_400_000.0;
                    let time_decay = (-0.02 * days).exp();
                    let neighbor_sal = self.dynamics.propagate(neighbor.salience.value(), weight, delta * time_decay);
                    self.store()
                        .update_last_seen_and_salience(&dst_id, user_id, neighbor.last_seen_at, Salience::new(neighbor_sal))
                        .await?;
                }
            }
        }

        self.query_cache.put(cache_key, ranked.clone());
        Ok(ranked)
    }

    /// Never errors: on total embedding failure, score every token-matching
    /// memory at a neutral 0.5; on no matches at all, return empty.
    async fn lexical_fallback(
        &self,
        _text: &str,
        k: usize,
        filters: &QueryFilters,
        query_tokens: &HashSet<String>,
    ) -> OmResult<Vec<RankedMemory>> {
        let user_id = filters.user_id.as_deref();
        let mut out = Vec::new();
        let mut cursor = None;
        loop {
            let batch = self
                .store()
                .list_memories(user_id, None, cursor.clone(), openmemory_core::constants::DECAY_SCAN_CHUNK)
                .await?;
            if batch.is_empty() {
                break;
            }
            for memory in &batch {
                if scoring::token_overlap(query_tokens, &canonical_tokens(&memory.content)) > 0.0 {
                    out.push(RankedMemory {
                        id: memory.id.clone(),
                        content: memory.content.clone(),
                        primary_sector: memory.primary_sector,
                        tags: memory.tags.clone(),
                        salience: memory.salience.value(),
                        score: 0.5,
                        last_seen_at: memory.last_seen_at,
                    });
                    if out.len() >= k {
                        return Ok(out);
                    }
                }
            }
            let last = batch.last().unwrap();
            cursor = Some((last.created_at, last.id.clone()));
        }
        Ok(out)
    }

    // --- update -----------------------------------------------------------

    pub async fn update(&self, id: &str, fields: UpdateFields, user_id: Option<&str>) -> OmResult<()> {
        let existing = self
            .store()
            .get_memory(id, user_id)
            .await?
            .ok_or_else(|| OmError::not_found("memory", id))?;

        let tx = self.store().begin().await?;
        let result: OmResult<()> = async {
            if let Some(content) = &fields.content {
                if *content != existing.content {
                    self.backend.vector_store().delete(id, user_id).await?;
                    let classification = self.classifier.classify(content, None);
                    let sectors = classification.all_sectors();
                    let vectors = self.embeddings.embed_query_all_sectors(content, &sectors).await?;
                    for (sector, vec) in &vectors {
                        self.backend.vector_store().store(id, *sector, vec, user_id).await?;
                    }
                    let mean_vec = vectors
                        .iter()
                        .find(|(s, _)| *s == classification.primary)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default();
                    self.store().update_mean_vec(id, user_id, mean_vec.len(), &mean_vec).await?;
                }
            }

            self.store()
                .update_memory_fields(
                    id,
                    user_id,
                    fields.content.as_deref(),
                    fields.tags.as_deref(),
                    fields.metadata.as_ref(),
                )
                .await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => tx.commit().await?,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        }

        self.emit(HsgEvent::MemoryUpdated { id: id.to_string(), user_id: user_id.map(str::to_string) });
        Ok(())
    }

    // --- delete -----------------------------------------------------------

    pub async fn delete(&self, id: &str, user_id: Option<&str>) -> OmResult<()> {
        let tx = self.store().begin().await?;
        let result: OmResult<()> = async {
            self.backend.vector_store().delete(id, user_id).await?;
            self.store().delete_waypoints_touching(id, user_id).await?;
            self.store().delete_memory(id, user_id).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => tx.commit().await?,
            Err(e) => {
                tx.rollback().await?;
                return Err(e);
            }
        }

        self.emit(HsgEvent::MemoryDeleted { id: id.to_string(), user_id: user_id.map(str::to_string) });
        Ok(())
    }

    /// Direct lookup, bypassing ranking — used by the ops facade's
    /// `get_user_summary`/debugging paths and by tests.
    pub async fn get(&self, id: &str, user_id: Option<&str>) -> OmResult<Option<openmemory_core::memory::Memory>> {
        self.store().get_memory(id, user_id).await
    }

    // --- reinforce -----------------------------------------------------------

    pub async fn reinforce(&self, id: &str, boost: f64, user_id: Option<&str>) -> OmResult<()> {
        let existing = self
            .store()
            .get_memory(id, user_id)
            .await?
            .ok_or_else(|| OmError::not_found("memory", id))?;

        let new_sal = existing.salience.boosted(boost);
        self.store().update_last_seen_and_salience(id, user_id, Utc::now(), new_sal).await?;

        if new_sal.is_consolidation_worthy() {
            self.store().record_stat(&Stats::new("consolidate", 1)).await?;
            self.emit(HsgEvent::Consolidated { id: id.to_string(), user_id: user_id.map(str::to_string) });
            info!(id, "memory crossed consolidation threshold");
        }

        Ok(())
    }
}
