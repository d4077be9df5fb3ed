//! Bound logger caching
//!
//! Binding a logger name can allocate inside the framework, so bound loggers
//! are kept in an LRU cache keyed by name. Every entry remembers the provider
//! generation it was bound under; a provider assignment bumps the generation
//! and clears the cache.

use crate::logging::trace_log;
use crate::provider::BoundLogger;
use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Cache performance statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub invalidations: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CachedLogger {
    generation: u64,
    logger: Arc<dyn BoundLogger>,
}

/// LRU cache of bound loggers
///
/// Default capacity: 256 names.
pub struct LoggerCache {
    entries: LruCache<String, CachedLogger>,
    stats: CacheStats,
}

impl LoggerCache {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Logger bound under `generation`, if cached
    pub fn get(&mut self, name: &str, generation: u64) -> Option<Arc<dyn BoundLogger>> {
        match self.entries.get(name) {
            Some(cached) if cached.generation == generation => {
                self.stats.hits += 1;
                trace_log!("Logger cache hit for '{}'", name);
                Some(Arc::clone(&cached.logger))
            }
            _ => {
                self.stats.misses += 1;
                trace_log!("Logger cache miss for '{}'", name);
                None
            }
        }
    }

    pub fn insert(&mut self, name: &str, generation: u64, logger: Arc<dyn BoundLogger>) {
        self.entries
            .push(name.to_string(), CachedLogger { generation, logger });
    }

    /// Drop every cached logger
    pub fn clear(&mut self) {
        trace_log!("Clearing logger cache");
        self.entries.clear();
        self.stats.invalidations += 1;
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}

impl Default for LoggerCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MemoryProvider;
    use crate::LogProvider;

    fn bound(name: &str) -> Arc<dyn BoundLogger> {
        MemoryProvider::new().get_logger(name)
    }

    #[test]
    fn test_cache_creation() {
        let cache = LoggerCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), LoggerCache::DEFAULT_CAPACITY);
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        assert_eq!(LoggerCache::with_capacity(0).capacity(), 1);
    }

    #[test]
    fn test_cache_miss_then_hit() {
        let mut cache = LoggerCache::new();
        assert!(cache.get("db", 1).is_none());
        cache.insert("db", 1, bound("db"));
        assert!(cache.get("db", 1).is_some());
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_stale_generation_misses() {
        let mut cache = LoggerCache::new();
        cache.insert("db", 1, bound("db"));
        assert!(cache.get("db", 2).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_cache_clear() {
        let mut cache = LoggerCache::new();
        cache.insert("db", 1, bound("db"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = LoggerCache::with_capacity(2);
        cache.insert("a", 1, bound("a"));
        cache.insert("b", 1, bound("b"));
        cache.get("a", 1);
        cache.insert("c", 1, bound("c"));
        assert!(cache.get("b", 1).is_none());
        assert!(cache.get("a", 1).is_some());
    }

    #[test]
    fn test_hit_rate_calculation() {
        let mut cache = LoggerCache::new();
        cache.get("a", 1);
        cache.get("b", 1);
        cache.get("c", 1);

        cache.insert("a", 1, bound("a"));
        cache.insert("b", 1, bound("b"));

        cache.get("a", 1);
        cache.get("b", 1);

        assert_eq!(cache.stats().hits, 2);
        assert_eq!(cache.stats().misses, 3);
        assert!((cache.stats().hit_rate() - 0.4).abs() < 0.001);

        cache.reset_stats();
        assert_eq!(cache.stats(), &CacheStats::default());
    }
}
