//! Memo of computed match lists, shared by every tree built on one index
//!
//! Entries are keyed by pattern and by the limits they were computed under.
//! The lock is released while a missing entry is computed, so two threads may
//! compute the same entry at once; both results are identical and the later
//! insert simply replaces the earlier one.

use crate::error::Result;
use crate::pattern::Pattern;
use crate::phrases::{IntersectLimits, MatchedHierarchicalPhrases};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    pattern: Pattern,
    limits: IntersectLimits,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

type Entries = LruCache<CacheKey, Arc<MatchedHierarchicalPhrases>, ahash::RandomState>;

/// Bounded LRU memo of match lists
pub struct PatternCache {
    entries: Option<Mutex<Entries>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PatternCache {
    /// Create a cache holding up to `capacity` lists (0 disables caching)
    pub fn new(capacity: usize) -> Self {
        let entries = NonZeroUsize::new(capacity)
            .map(|cap| Mutex::new(LruCache::with_hasher(cap, ahash::RandomState::new())));
        Self {
            entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(
        &self,
        pattern: &Pattern,
        limits: IntersectLimits,
    ) -> Option<Arc<MatchedHierarchicalPhrases>> {
        let entries = self.entries.as_ref()?;
        let key = CacheKey {
            pattern: pattern.clone(),
            limits,
        };

        let found = match entries.lock() {
            Ok(mut cache) => cache.get(&key).cloned(),
            Err(_) => None,
        };

        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    pub fn insert(
        &self,
        pattern: &Pattern,
        limits: IntersectLimits,
        matches: Arc<MatchedHierarchicalPhrases>,
    ) {
        if let Some(entries) = &self.entries
            && let Ok(mut cache) = entries.lock()
        {
            let key = CacheKey {
                pattern: pattern.clone(),
                limits,
            };
            cache.put(key, matches);
        }
    }

    /// Return the cached list for `pattern`, computing and storing it if absent
    pub fn get_or_compute<F>(
        &self,
        pattern: &Pattern,
        limits: IntersectLimits,
        compute: F,
    ) -> Result<Arc<MatchedHierarchicalPhrases>>
    where
        F: FnOnce() -> Result<MatchedHierarchicalPhrases>,
    {
        if let Some(found) = self.get(pattern, limits) {
            return Ok(found);
        }

        let matches = Arc::new(compute()?);
        self.insert(pattern, limits, Arc::clone(&matches));
        Ok(matches)
    }

    pub fn clear(&self) {
        if let Some(entries) = &self.entries
            && let Ok(mut cache) = entries.lock()
        {
            cache.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self
            .entries
            .as_ref()
            .and_then(|e| e.lock().ok().map(|c| c.len()))
            .unwrap_or(0);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }
}
