//! Durable model storage with a bounded cache in front of it
//!
//! The durable store is reached only through the [`ModelStore`] contract
//! (atomic insert, point read). [`ModelRepository`] layers cache-aside
//! semantics on top: reads fault through to the store on a miss, successful
//! writes and reads populate the cache, and nothing ever invalidates it
//! because stored models are immutable.

mod cache;
mod file;
mod memory;
mod repository;

pub use cache::{ModelCache, DEFAULT_CACHE_CAPACITY};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use repository::{random_model_name, ModelRepository, DEFAULT_STORE_TIMEOUT};

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use async_trait::async_trait;

/// Table holding trained models
pub const MODELS_TABLE: &str = "slr_models";

/// Persisted layout of a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredModelRecord {
    /// Primary key
    pub name: String,
    /// `[coefficient, intercept]`
    pub params: Vec<f64>,
    /// Commit timestamp assigned by the store
    pub creation_time: DateTime<Utc>,
}

/// Minimal contract of the durable key-value store
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Insert a new record as a single atomic write
    ///
    /// Fails if the name is already taken. Returns the commit timestamp.
    ///
    /// A caller that drops this future (for example on timeout) cannot tell
    /// whether the write committed: the record may exist even though the
    /// insert reported an error. Names are never reused, so such a record is
    /// only unreachable, never wrong.
    async fn insert(&self, name: &str, params: [f64; 2]) -> Result<DateTime<Utc>>;

    /// Point read by primary key
    async fn read(&self, name: &str) -> Result<StoredModelRecord>;
}
