//! Path matching cache.
//!
//! [`MatchCache`] memoizes [`RouteTree::match_path`](crate::RouteTree::match_path)
//! results per input path, misses included. It is gated behind the `cache`
//! feature flag and uses the [`lru`] crate internally.
//!
//! The router clears the cache whenever the route tree or a matching option
//! changes, so a cached entry is always what a fresh match would return.
//! [`CacheStats`] tracks hits, misses, and invalidations.
//!
//! # Examples
//!
//! ```
//! use navigator_core::cache::MatchCache;
//!
//! let mut cache = MatchCache::new();
//! assert!(cache.get("/users").is_none());
//! cache.insert("/users".to_string(), None);
//!
//! assert_eq!(cache.get("/users"), Some(None));
//! assert_eq!(cache.stats().hits, 1);
//! assert_eq!(cache.stats().misses, 1);
//! ```

use crate::tree::RouteMatch;
use crate::{debug_log, trace_log};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Counters tracking cache hit/miss rates and invalidations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups answered from the cache.
    pub hits: usize,
    /// Number of lookups that had to match.
    pub misses: usize,
    /// Number of full invalidations (via [`MatchCache::clear`]).
    pub invalidations: usize,
}

impl CacheStats {
    /// Hit rate in `0.0..=1.0`, `0.0` before any lookup.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of match results keyed by path.
#[derive(Debug)]
pub struct MatchCache {
    entries: LruCache<String, Option<RouteMatch>>,
    stats: CacheStats,
}

impl MatchCache {
    const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(255);

    /// Cache with the default capacity (256 paths).
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Cache with a custom capacity.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Cached result for `path`: `Some(None)` is a cached miss.
    pub fn get(&mut self, path: &str) -> Option<Option<RouteMatch>> {
        if let Some(entry) = self.entries.get(path) {
            self.stats.hits += 1;
            trace_log!("Match cache hit for path: '{}'", path);
            Some(entry.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Match cache miss for path: '{}'", path);
            None
        }
    }

    pub fn insert(&mut self, path: String, result: Option<RouteMatch>) {
        self.entries.push(path, result);
    }

    /// Drop every entry and count an invalidation.
    pub fn clear(&mut self) {
        let len = self.entries.len();
        self.entries.clear();
        self.stats.invalidations += 1;
        debug_log!(
            "Match cache cleared: {} entries removed ({} total invalidations, hit rate: {:.1}%)",
            len,
            self.stats.invalidations,
            self.stats.hit_rate() * 100.0
        );
    }

    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MatchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MatchCache {
    fn clone(&self) -> Self {
        Self {
            entries: LruCache::new(self.entries.cap()),
            stats: CacheStats::default(),
        }
    }
}
