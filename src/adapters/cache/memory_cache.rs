use std::num::NonZeroUsize;
use std::sync::RwLock;

use lru::LruCache;

use crate::ports::cache::ProjectionCache;

const FALLBACK_CAPACITY: NonZeroUsize = NonZeroUsize::new(100).unwrap();

/// LRU memo of projection output. Entries never expire: the repository is
/// immutable after load, so a key always maps to the same output.
pub struct MemoryCache {
    inner: RwLock<LruCache<String, String>>,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries).unwrap_or_else(|| {
            tracing::warn!("Cache max_entries was 0, defaulting to {FALLBACK_CAPACITY}");
            FALLBACK_CAPACITY
        });
        Self {
            inner: RwLock::new(LruCache::new(cap)),
        }
    }
}

impl ProjectionCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        // LRU bookkeeping mutates on read
        let mut cache = self.inner.write().map_or_else(
            |_| {
                tracing::error!("Cache lock poisoned on get('{key}'), returning miss");
                None
            },
            Some,
        )?;
        cache.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut cache) = self.inner.write() {
            cache.put(key.to_string(), value.to_string());
        } else {
            tracing::error!("Cache lock poisoned on set('{key}'), skipping write");
        }
    }
}
