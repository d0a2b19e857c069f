//! Content-addressed memo of whole-batch results.
//!
//! Keys come from [`Hasher::batch_key`](crate::pipeline::Hasher::batch_key),
//! so identical uploads with an identical transform chain hit the same entry.
//! Entries expire after a fixed TTL and the least recently used one is evicted
//! once capacity is reached.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::types::BatchResult;

type Entry = (Arc<BatchResult>, Instant);

/// Bounded LRU cache of batch results with per-entry expiry.
pub struct ResultCache {
    entries: Mutex<LruCache<String, Entry>>,
    ttl: Duration,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` batches for `ttl` each.
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Build from the `[cache]` section; `None` when caching is disabled.
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let capacity = NonZeroUsize::new(config.capacity)?;
        Some(Self::new(capacity, Duration::from_secs(config.ttl_secs)))
    }

    /// Look up a live entry, dropping it if it has expired.
    pub fn get(&self, key: &str) -> Option<Arc<BatchResult>> {
        self.get_at(key, Instant::now())
    }

    /// Store a result. Cancelled batches are never cached.
    pub fn insert(&self, key: String, result: Arc<BatchResult>) {
        if result.was_cancelled() {
            tracing::debug!("Not caching cancelled batch {}", short(&key));
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.put(key, (result, Instant::now()));
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<Arc<BatchResult>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let (result, stored) = entries.get(key).map(|(r, s)| (r.clone(), *s))?;
        if now.saturating_duration_since(stored) >= self.ttl {
            tracing::debug!("Cache entry {} expired", short(key));
            entries.pop(key);
            return None;
        }
        tracing::debug!("Cache hit for batch {}", short(key));
        Some(result)
    }
}

fn short(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ItemError;
    use crate::types::FailedItem;

    fn cache(capacity: usize, ttl: Duration) -> ResultCache {
        ResultCache::new(NonZeroUsize::new(capacity).unwrap(), ttl)
    }

    #[test]
    fn test_hit_returns_same_arc() {
        let cache = cache(4, Duration::from_secs(60));
        let result = Arc::new(BatchResult::default());
        cache.insert("k".to_string(), result.clone());
        let hit = cache.get("k").unwrap();
        assert!(Arc::ptr_eq(&hit, &result));
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = cache(4, Duration::from_secs(10));
        cache.insert("k".to_string(), Arc::new(BatchResult::default()));
        let later = Instant::now() + Duration::from_secs(11);
        assert!(cache.get_at("k", later).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let cache = cache(2, Duration::from_secs(60));
        cache.insert("a".to_string(), Arc::new(BatchResult::default()));
        cache.insert("b".to_string(), Arc::new(BatchResult::default()));
        // touch a so b becomes the eviction candidate
        assert!(cache.get("a").is_some());
        cache.insert("c".to_string(), Arc::new(BatchResult::default()));
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cancelled_batches_are_not_stored() {
        let cache = cache(4, Duration::from_secs(60));
        let result = BatchResult {
            failed: vec![FailedItem {
                index: 0,
                name: "a.png".to_string(),
                reason: ItemError::Cancelled("a.png".to_string()),
            }],
            ..Default::default()
        };
        cache.insert("k".to_string(), Arc::new(result));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_disabled_config() {
        let config = CacheConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(ResultCache::from_config(&config).is_none());
        assert!(ResultCache::from_config(&CacheConfig::default()).is_some());
    }
}
