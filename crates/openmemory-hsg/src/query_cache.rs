//! Query-result cache keyed on `(text, k, sorted filters)` with a short
//! TTL (§4.6 step 1/10).

use moka::sync::Cache;
use openmemory_core::config::RetrievalConfig;

use crate::types::{QueryFilters, RankedMemory};

#[derive(Clone)]
pub struct QueryCache {
    cache: Cache<String, Vec<RankedMemory>>,
}

impl QueryCache {
    pub fn new(config: &RetrievalConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.query_cache_size)
            .time_to_live(std::time::Duration::from_secs(config.query_cache_ttl_secs))
            .build();
        Self { cache }
    }

    pub fn key(text: &str, k: usize, filters: &QueryFilters) -> String {
        let mut sectors = filters.sectors.clone().unwrap_or_default();
        sectors.sort_by_key(|s| s.as_str());
        format!(
            "{}|{}|{}|{:?}|{:?}|{:?}|{}",
            text,
            k,
            sectors.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(","),
            filters.min_salience,
            filters.start_time,
            filters.end_time,
            filters.user_id.as_deref().unwrap_or("anonymous"),
        )
    }

    pub fn get(&self, key: &str) -> Option<Vec<RankedMemory>> {
        self.cache.get(key)
    }

    pub fn put(&self, key: String, value: Vec<RankedMemory>) {
        self.cache.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_filters_produce_distinct_keys() {
        let a = QueryFilters::default();
        let mut b = QueryFilters::default();
        b.min_salience = Some(0.5);
        assert_ne!(QueryCache::key("hello", 5, &a), QueryCache::key("hello", 5, &b));
    }

    #[test]
    fn sector_order_does_not_change_the_key() {
        use openmemory_core::memory::Sector;
        let mut a = QueryFilters::default();
        a.sectors = Some(vec![Sector::Episodic, Sector::Semantic]);
        let mut b = QueryFilters::default();
        b.sectors = Some(vec![Sector::Semantic, Sector::Episodic]);
        assert_eq!(QueryCache::key("hello", 5, &a), QueryCache::key("hello", 5, &b));
    }
}
