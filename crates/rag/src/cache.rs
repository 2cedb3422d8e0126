//! In-memory answer cache keyed by exact query text.
//!
//! Bounded by entry count with TinyLFU admission, optional TTL.
//! Clones share the same underlying store.

use agrodoc_core::config::CacheSettings;
use moka::sync::Cache;
use std::time::Duration;

#[derive(Clone)]
pub struct AnswerCache {
    cache: Cache<String, String>,
}

impl AnswerCache {
    pub fn new(max_entries: u64, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().max_capacity(max_entries);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
        }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.capacity, settings.ttl_secs.map(Duration::from_secs))
    }

    pub fn get(&self, query: &str) -> Option<String> {
        self.cache.get(query)
    }

    /// Store an answer; the latest write for a query wins.
    pub fn put(&self, query: impl Into<String>, answer: impl Into<String>) {
        self.cache.insert(query.into(), answer.into());
    }

}

impl std::fmt::Debug for AnswerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let cache = AnswerCache::new(16, None);
        cache.put("What is NPK?", "Nitrogen, phosphorus, potassium");
        assert_eq!(
            cache.get("What is NPK?").as_deref(),
            Some("Nitrogen, phosphorus, potassium")
        );
    }

    #[test]
    fn test_exact_match_only() {
        let cache = AnswerCache::new(16, None);
        cache.put("What is NPK?", "answer");
        assert_eq!(cache.get("what is npk?"), None);
        assert_eq!(cache.get("What is NPK? "), None);
    }

    #[test]
    fn test_last_write_wins() {
        let cache = AnswerCache::new(16, None);
        cache.put("q", "first");
        cache.put("q", "second");
        assert_eq!(cache.get("q").as_deref(), Some("second"));
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = AnswerCache::new(16, None);
        let other = cache.clone();
        other.put("q", "shared");
        assert_eq!(cache.get("q").as_deref(), Some("shared"));
    }

    #[test]
    fn test_from_settings() {
        let cache = AnswerCache::from_settings(&CacheSettings {
            capacity: 8,
            ttl_secs: Some(60),
        });
        cache.put("q", "a");
        assert_eq!(cache.get("q").as_deref(), Some("a"));
    }
}
