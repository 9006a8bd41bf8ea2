//! Tag-based response cache
//!
//! Query results are cached as JSON values under string keys, each entry
//! carrying a set of tags. Invalidation happens by tag, so publishing one
//! question can evict exactly the pages that rendered it: the question page,
//! its category, its cluster, and the question lists.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::metrics::{CACHE_HITS_TOTAL, CACHE_INVALIDATIONS_TOTAL, CACHE_MISSES_TOTAL};

struct CacheEntry {
    value: serde_json::Value,
    tags: Vec<String>,
    inserted_at: Instant,
}

/// In-process cache with tag invalidation and a global TTL.
pub struct TagCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

/// Well-known tag constructors.
pub mod tags {
    /// All question listings (hub pages, sitemaps, counts).
    pub const QUESTIONS: &str = "questions";

    pub fn question(slug: &str) -> String {
        format!("question:{slug}")
    }

    pub fn category(slug: &str) -> String {
        format!("category:{slug}")
    }

    pub fn cluster(slug: &str) -> String {
        format!("cluster:{slug}")
    }
}

impl TagCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Look up a cached value, deserializing it into the caller's type.
    /// Expired entries are removed on access.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let family = key_family(key);

        if let Some(entry) = self.entries.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                if let Ok(value) = serde_json::from_value(entry.value.clone()) {
                    CACHE_HITS_TOTAL.with_label_values(&[family]).inc();
                    return Some(value);
                }
            }
        }

        // Expired or undecodable: drop it so the next put starts fresh.
        self.entries.remove(key);
        CACHE_MISSES_TOTAL.with_label_values(&[family]).inc();
        None
    }

    /// Store a value under a key with its invalidation tags.
    /// Serialization failure means the value is simply not cached.
    pub fn put<T: Serialize>(&self, key: &str, value: &T, tags: Vec<String>) {
        if let Ok(json) = serde_json::to_value(value) {
            self.entries.insert(
                key.to_string(),
                CacheEntry {
                    value: json,
                    tags,
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    /// Evict every entry carrying the given tag. Returns eviction count.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        // Count inside the closure; comparing len() before and after races
        // with concurrent inserts.
        let mut evicted = 0usize;
        self.entries.retain(|_, entry| {
            let keep = !entry.tags.iter().any(|t| t == tag);
            if !keep {
                evicted += 1;
            }
            keep
        });

        CACHE_INVALIDATIONS_TOTAL
            .with_label_values(&[key_family(tag)])
            .inc();
        debug!("invalidated tag '{tag}': {evicted} entries evicted");
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Metric label: the part of a key or tag before the first ':'.
fn key_family(key: &str) -> &str {
    key.split(':').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_roundtrip() {
        let cache = TagCache::new(3600);
        cache.put("page:home", &vec!["a", "b"], vec![tags::QUESTIONS.to_string()]);

        let got: Option<Vec<String>> = cache.get("page:home");
        assert_eq!(got, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache = TagCache::new(3600);
        let got: Option<String> = cache.get("nothing");
        assert!(got.is_none());
    }

    #[test]
    fn test_invalidate_by_tag() {
        let cache = TagCache::new(3600);
        cache.put(
            "page:answer:sleep",
            &"body",
            vec![tags::question("sleep"), tags::category("Sleep")],
        );
        cache.put("page:home", &"home", vec![tags::QUESTIONS.to_string()]);

        let evicted = cache.invalidate_tag(&tags::question("sleep"));
        assert_eq!(evicted, 1);

        let gone: Option<String> = cache.get("page:answer:sleep");
        assert!(gone.is_none());

        let kept: Option<String> = cache.get("page:home");
        assert_eq!(kept, Some("home".to_string()));
    }

    #[test]
    fn test_invalidate_counts_every_tagged_entry() {
        let cache = TagCache::new(3600);
        cache.put("a", &1u32, vec![tags::QUESTIONS.to_string()]);
        cache.put("b", &2u32, vec![tags::QUESTIONS.to_string()]);
        cache.put("c", &3u32, vec![tags::category("Sleep")]);

        assert_eq!(cache.invalidate_tag(tags::QUESTIONS), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_unknown_tag_is_noop() {
        let cache = TagCache::new(3600);
        cache.put("k", &1u32, vec![tags::QUESTIONS.to_string()]);
        assert_eq!(cache.invalidate_tag("category:Nothing"), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = TagCache::new(0); // Everything expires immediately
        cache.put("k", &42u32, vec![]);
        let got: Option<u32> = cache.get("k");
        assert!(got.is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_replaces_tags() {
        let cache = TagCache::new(3600);
        cache.put("k", &1u32, vec![tags::category("A")]);
        cache.put("k", &2u32, vec![tags::category("B")]);

        cache.invalidate_tag(&tags::category("A"));
        let got: Option<u32> = cache.get("k");
        assert_eq!(got, Some(2));
    }
}
