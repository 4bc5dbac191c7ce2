//! In-memory query vector cache on moka.
//!
//! Keys are blake3 hashes of the query text, so identical queries share an
//! entry regardless of where they come from.

use std::time::Duration;

use moka::sync::Cache;

/// Bounded query embedding cache. TinyLFU admission, idle expiry.
pub struct QueryCache {
    cache: Cache<String, Vec<f32>>,
}

impl QueryCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(Duration::from_secs(3600))
            .build();
        Self { cache }
    }

    /// Cache key of a query text.
    pub fn key(text: &str) -> String {
        blake3::hash(text.as_bytes()).to_hex().to_string()
    }

    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        self.cache.get(&Self::key(text))
    }

    pub fn insert(&self, text: &str, vector: Vec<f32>) {
        self.cache.insert(Self::key(text), vector);
    }

    /// Approximate entry count; moka settles pending writes lazily.
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let cache = QueryCache::new(100);
        cache.insert("list users", vec![1.0, 2.0]);
        assert_eq!(cache.get("list users"), Some(vec![1.0, 2.0]));
        assert_eq!(cache.get("list orders"), None);
    }

    #[test]
    fn keys_are_content_hashes() {
        assert_eq!(QueryCache::key("a"), QueryCache::key("a"));
        assert_ne!(QueryCache::key("a"), QueryCache::key("b"));
        assert_eq!(QueryCache::key("a").len(), 64);
    }

    #[test]
    fn clear_drops_entries() {
        let cache = QueryCache::new(100);
        cache.insert("a", vec![1.0]);
        cache.clear();
        assert_eq!(cache.get("a"), None);
    }
}
