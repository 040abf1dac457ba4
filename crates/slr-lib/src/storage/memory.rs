//! In-process model store

use super::{async_trait, ModelStore, StoredModelRecord};
use crate::error::{Result, SlrError};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Model store backed by a concurrent map
///
/// Durable only for the lifetime of the process; used for tests and
/// ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, StoredModelRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ModelStore for MemoryStore {
    async fn insert(&self, name: &str, params: [f64; 2]) -> Result<DateTime<Utc>> {
        match self.records.entry(name.to_string()) {
            Entry::Occupied(_) => Err(SlrError::Storage(format!(
                "model {} already exists",
                name
            ))),
            Entry::Vacant(slot) => {
                let creation_time = Utc::now();
                slot.insert(StoredModelRecord {
                    name: name.to_string(),
                    params: params.to_vec(),
                    creation_time,
                });
                Ok(creation_time)
            }
        }
    }

    async fn read(&self, name: &str) -> Result<StoredModelRecord> {
        self.records
            .get(name)
            .map(|record| record.value().clone())
            .ok_or_else(|| SlrError::ModelNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_then_read() {
        let store = MemoryStore::new();
        let ts = store.insert("abc", [1.5, -2.0]).await.unwrap();

        let record = store.read("abc").await.unwrap();
        assert_eq!(record.params, vec![1.5, -2.0]);
        assert_eq!(record.creation_time, ts);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = MemoryStore::new();
        store.insert("abc", [1.0, 1.0]).await.unwrap();

        let err = store.insert("abc", [2.0, 2.0]).await.unwrap_err();
        assert!(matches!(err, SlrError::Storage(_)));
        assert_eq!(store.read("abc").await.unwrap().params, vec![1.0, 1.0]);
    }

    #[tokio::test]
    async fn test_missing_is_not_found() {
        let store = MemoryStore::new();
        assert!(store.read("nope").await.unwrap_err().is_not_found());
    }
}
