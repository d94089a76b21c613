use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use crate::types::{MatchCounters, MatchMethod};

/// The stored outcome of one full match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resultset {
    pub(crate) profiles: Box<[usize]>,
    pub(crate) signature: Option<usize>,
    pub(crate) method: MatchMethod,
    pub(crate) difference: u32,
    pub(crate) counters: MatchCounters,
}

/// Point-in-time view of cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub capacity: usize,
    pub len: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache, `0.0` before any lookup.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded LRU memo of match outcomes keyed by the (truncated) input.
///
/// Internally synchronized: every method takes `&self`. A capacity of zero
/// disables the cache entirely; lookups then neither hit nor count as misses.
pub struct ResultsetCache {
    entries: Option<Mutex<LruCache<Box<str>, Arc<Resultset>>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultsetCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| lock(entries).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. Hit and miss counters are kept.
    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            lock(entries).clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            capacity: self.capacity,
            len: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<Resultset>> {
        let entries = self.entries.as_ref()?;
        let hit = lock(entries).get(key).cloned();
        let counter = if hit.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        hit
    }

    pub(crate) fn insert(&self, key: &str, resultset: Resultset) {
        if let Some(entries) = &self.entries {
            lock(entries).put(Box::from(key), Arc::new(resultset));
        }
    }
}

impl std::fmt::Debug for ResultsetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultsetCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
