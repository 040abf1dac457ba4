//! Cache-aside model repository

use super::{ModelCache, ModelStore};
use crate::error::{Result, SlrError};
use crate::observability::SlrMetrics;
use crate::regression::Model;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Upper bound on a single durable store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Random bytes per generated model name (80 bits)
const MODEL_NAME_BYTES: usize = 10;

/// Generate a fresh URL-safe model name from the OS entropy source
pub fn random_model_name() -> Result<String> {
    let mut bytes = [0u8; MODEL_NAME_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| SlrError::Entropy(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Durable model storage fronted by a bounded cache
///
/// The store is the single source of truth. Concurrent loads of the same
/// missing name may each read through to the store; records are immutable
/// so the duplicate reads are harmless.
pub struct ModelRepository {
    store: Arc<dyn ModelStore>,
    cache: ModelCache,
    store_timeout: Duration,
    metrics: SlrMetrics,
}

impl ModelRepository {
    pub fn new(store: Arc<dyn ModelStore>, cache: ModelCache) -> Self {
        Self {
            store,
            cache,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            metrics: SlrMetrics::new(),
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub fn store_timeout(&self) -> Duration {
        self.store_timeout
    }

    /// Number of models currently held in the cache
    pub fn cached_models(&self) -> usize {
        self.cache.len()
    }

    /// Persist a model under a freshly generated name
    ///
    /// Nothing is cached unless the durable write succeeded.
    pub async fn save(&self, model: &Model) -> Result<(String, DateTime<Utc>)> {
        let name = random_model_name()?;

        let creation_time = self
            .call_store("insert", self.store.insert(&name, model.to_params()))
            .await?;

        let named = model.clone().with_name(name.clone());
        if let Some(evicted) = self.cache.insert(&name, named) {
            debug!(evicted = %evicted, "Evicted model from cache");
        }
        self.metrics.set_cached_models(self.cache.len() as i64);

        Ok((name, creation_time))
    }

    /// Load a model by name, returning whether it came from the cache
    pub async fn load(&self, name: &str) -> Result<(Model, bool)> {
        if let Some(model) = self.cache.get(name) {
            self.metrics.inc_cache_hits();
            return Ok((model, true));
        }
        self.metrics.inc_cache_misses();

        let record = self.call_store("read", self.store.read(name)).await?;
        let model = Model::from_params(&record.params, record.name)?;

        if let Some(evicted) = self.cache.insert(name, model.clone()) {
            debug!(evicted = %evicted, "Evicted model from cache");
        }
        self.metrics.set_cached_models(self.cache.len() as i64);

        Ok((model, false))
    }

    /// Run a store call under the configured timeout, recording latency
    async fn call_store<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SlrError::Timeout(self.store_timeout)),
        };
        self.metrics
            .observe_store_latency(operation, start.elapsed().as_secs_f64());

        if let Err(e) = &result {
            if !e.is_not_found() {
                self.metrics.inc_store_errors(operation);
                warn!(operation = operation, error = %e, "Model store call failed");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{async_trait, MemoryStore, StoredModelRecord};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store wrapper counting reads that reach the durable layer
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl ModelStore for CountingStore {
        async fn insert(&self, name: &str, params: [f64; 2]) -> Result<DateTime<Utc>> {
            self.inner.insert(name, params).await
        }

        async fn read(&self, name: &str) -> Result<StoredModelRecord> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read(name).await
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ModelStore for FailingStore {
        async fn insert(&self, _name: &str, _params: [f64; 2]) -> Result<DateTime<Utc>> {
            Err(SlrError::Storage("store unreachable".to_string()))
        }

        async fn read(&self, _name: &str) -> Result<StoredModelRecord> {
            Err(SlrError::Storage("store unreachable".to_string()))
        }
    }

    struct SlowStore;

    #[async_trait]
    impl ModelStore for SlowStore {
        async fn insert(&self, _name: &str, _params: [f64; 2]) -> Result<DateTime<Utc>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Utc::now())
        }

        async fn read(&self, name: &str) -> Result<StoredModelRecord> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(SlrError::ModelNotFound(name.to_string()))
        }
    }

    #[test]
    fn test_random_model_names() {
        let names: HashSet<String> = (0..1000).map(|_| random_model_name().unwrap()).collect();
        assert_eq!(names.len(), 1000);

        let name = names.iter().next().unwrap();
        assert_eq!(name.len(), MODEL_NAME_BYTES * 2);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let repository = ModelRepository::new(store.clone(), ModelCache::new(10));

        let model = Model::new(2.0, -0.5);
        let (name, _) = repository.save(&model).await.unwrap();
        assert_eq!(store.len(), 1);

        let (loaded, _) = repository.load(&name).await.unwrap();
        assert_eq!(loaded.coefficient, 2.0);
        assert_eq!(loaded.intercept, -0.5);
        assert_eq!(loaded.name.as_deref(), Some(name.as_str()));
    }

    #[tokio::test]
    async fn test_second_load_served_from_cache() {
        let store = Arc::new(CountingStore::default());
        store.inner.insert("known", [1.0, 2.0]).await.unwrap();
        let repository = ModelRepository::new(store.clone(), ModelCache::new(10));

        let (first, from_cache) = repository.load("known").await.unwrap();
        assert!(!from_cache);
        let (second, from_cache) = repository.load("known").await.unwrap();
        assert!(from_cache);

        assert_eq!(first, second);
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_saved_model_is_cached() {
        let store = Arc::new(CountingStore::default());
        let repository = ModelRepository::new(store.clone(), ModelCache::new(10));

        let (name, _) = repository.save(&Model::new(1.0, 1.0)).await.unwrap();
        let (_, from_cache) = repository.load(&name).await.unwrap();

        assert!(from_cache);
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_model_is_not_found() {
        let repository = ModelRepository::new(Arc::new(MemoryStore::new()), ModelCache::new(10));
        repository.save(&Model::new(1.0, 0.0)).await.unwrap();

        let err = repository.load("does-not-exist").await.unwrap_err();
        assert!(matches!(err, SlrError::ModelNotFound(_)));
        assert_eq!(repository.cached_models(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_cache_empty() {
        let repository = ModelRepository::new(Arc::new(FailingStore), ModelCache::new(10));

        let err = repository.save(&Model::new(1.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, SlrError::Storage(_)));
        assert_eq!(repository.cached_models(), 0);

        assert!(repository.load("anything").await.is_err());
        assert_eq!(repository.cached_models(), 0);
    }

    #[tokio::test]
    async fn test_eviction_faults_back_to_store() {
        let store = Arc::new(CountingStore::default());
        for name in ["a", "b", "c"] {
            store.inner.insert(name, [1.0, 0.0]).await.unwrap();
        }
        let repository = ModelRepository::new(store.clone(), ModelCache::new(2));

        repository.load("a").await.unwrap();
        repository.load("b").await.unwrap();
        repository.load("a").await.unwrap();
        // "b" is least recently used and makes room for "c"
        repository.load("c").await.unwrap();
        assert_eq!(store.reads.load(Ordering::SeqCst), 3);

        let (_, from_cache) = repository.load("a").await.unwrap();
        assert!(from_cache);
        let (_, from_cache) = repository.load("b").await.unwrap();
        assert!(!from_cache);
        assert_eq!(store.reads.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_store_timeout() {
        let repository = ModelRepository::new(Arc::new(SlowStore), ModelCache::new(10))
            .with_store_timeout(Duration::from_millis(100));

        let err = repository.load("slow").await.unwrap_err();
        assert!(matches!(err, SlrError::Timeout(_)));

        let err = repository.save(&Model::new(1.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, SlrError::Timeout(_)));
        assert_eq!(repository.cached_models(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_loads_agree() {
        let store = Arc::new(MemoryStore::new());
        store.insert("shared", [3.0, 4.0]).await.unwrap();
        let repository = Arc::new(ModelRepository::new(store, ModelCache::new(10)));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repository = repository.clone();
                tokio::spawn(async move { repository.load("shared").await.unwrap().0 })
            })
            .collect();

        for handle in handles {
            let model = handle.await.unwrap();
            assert_eq!(model.to_params(), [3.0, 4.0]);
        }
        assert_eq!(repository.cached_models(), 1);
    }
}
