//! Result cache: LRU (size 500, TTL 5 min) keyed on
//! `(provider, tier, sorted-sectors, text-prefix[0:100])`, storing the
//! entire result set for that call (§4.4).

use std::time::Duration;

use moka::sync::Cache;
use openmemory_core::memory::Sector;

const MAX_ENTRIES: u64 = 500;
const TTL: Duration = Duration::from_secs(5 * 60);

pub type CachedResult = Vec<(Sector, Vec<f32>)>;

pub struct ResultCache {
    cache: Cache<String, CachedResult>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    pub fn new() -> Self {
        Self { cache: Cache::builder().max_capacity(MAX_ENTRIES).time_to_live(TTL).build() }
    }

    pub fn key(provider: &str, tier: &str, sectors: &[Sector], text: &str) -> String {
        let mut sorted: Vec<&str> = sectors.iter().map(|s| s.as_str()).collect();
        sorted.sort_unstable();
        let prefix: String = text.chars().take(100).collect();
        format!("{provider}|{tier}|{}|{prefix}", sorted.join(","))
    }

    /// Reinserts on hit so moka's TinyLFU admission/LRU order refreshes.
    pub fn get(&self, key: &str) -> Option<CachedResult> {
        let hit = self.cache.get(key);
        if let Some(v) = &hit {
            self.cache.insert(key.to_string(), v.clone());
        }
        hit
    }

    pub fn put(&self, key: String, result: CachedResult) {
        self.cache.insert(key, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_sector_order() {
        let a = ResultCache::key("synthetic", "fast", &[Sector::Episodic, Sector::Semantic], "hello");
        let b = ResultCache::key("synthetic", "fast", &[Sector::Semantic, Sector::Episodic], "hello");
        assert_eq!(a, b);
    }

    #[test]
    fn key_truncates_text_to_100_chars() {
        let long = "x".repeat(500);
        let key = ResultCache::key("synthetic", "fast", &[Sector::Semantic], &long);
        assert!(key.ends_with(&"x".repeat(100)));
        assert!(!key.ends_with(&"x".repeat(101)));
    }

    #[test]
    fn put_then_get_hits() {
        let cache = ResultCache::new();
        let key = ResultCache::key("synthetic", "fast", &[Sector::Semantic], "hi");
        cache.put(key.clone(), vec![(Sector::Semantic, vec![1.0, 2.0])]);
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn miss_returns_none() {
        let cache = ResultCache::new();
        assert!(cache.get("nonexistent").is_none());
    }
}
