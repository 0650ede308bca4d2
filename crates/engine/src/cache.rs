//! Keyed TTL cache for report results
//!
//! Cache-aside: callers check `get`, compute on a miss and `insert`.
//! Concurrent misses on the same key may compute twice; the last insert wins.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    inserted_at: Instant,
    value: V,
}

/// Thread-safe cache whose entries expire `ttl` after insertion
pub struct TtlCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|e| e.inserted_at.elapsed() < self.ttl)
            .map(|e| e.value.clone())
    }

    /// Store `value` under `key`, dropping any expired entries on the way
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let ttl = self.ttl;
        entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
        entries.insert(
            key.into(),
            CacheEntry {
                inserted_at: Instant::now(),
                value,
            },
        );
    }
}
