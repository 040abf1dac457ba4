//! Bounded LRU cache of loaded models

use crate::regression::Model;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of cached models
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Thread-safe LRU mapping from model name to model
///
/// Every lookup updates recency, so lookups and inserts both take the lock.
/// The lock is never held across an await point.
pub struct ModelCache {
    entries: Mutex<LruCache<String, Model>>,
    capacity: NonZeroUsize,
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ModelCache {
    /// Create a cache holding at most `capacity` models (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
        }
    }

    // Entries are immutable models, so a panic elsewhere cannot leave the
    // map in a state worth refusing to read.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, Model>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a model, marking it most recently used
    pub fn get(&self, name: &str) -> Option<Model> {
        self.lock().get(name).cloned()
    }

    /// Insert a model, returning the name of the evicted entry if any
    pub fn insert(&self, name: &str, model: Model) -> Option<String> {
        match self.lock().push(name.to_string(), model) {
            Some((evicted, _)) if evicted != name => Some(evicted),
            _ => None,
        }
    }

    /// Check for a model without touching recency
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(c: f64) -> Model {
        Model::new(c, 0.0)
    }

    #[test]
    fn test_get_after_insert() {
        let cache = ModelCache::new(4);
        assert!(cache.get("a").is_none());

        cache.insert("a", model(1.0));
        assert_eq!(cache.get("a"), Some(model(1.0)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = ModelCache::new(2);
        cache.insert("a", model(1.0));
        cache.insert("b", model(2.0));

        // Touch "a" so "b" becomes the eviction candidate
        assert!(cache.get("a").is_some());
        let evicted = cache.insert("c", model(3.0));

        assert_eq!(evicted.as_deref(), Some("b"));
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_reinsert_same_key_is_not_eviction() {
        let cache = ModelCache::new(1);
        cache.insert("a", model(1.0));
        assert_eq!(cache.insert("a", model(1.0)), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_capacity_rounds_up() {
        let cache = ModelCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert("a", model(1.0));
        cache.insert("b", model(2.0));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(ModelCache::default().capacity(), DEFAULT_CACHE_CAPACITY);
    }
}
