//! File-backed model store
//!
//! Each record is one JSON document at `<root>/slr_models/<name>.json`.
//! Inserts write a temp file, sync it, then hard-link it into place, so a
//! record either appears complete or not at all and an existing name is never
//! overwritten.

use super::{async_trait, ModelStore, StoredModelRecord, MODELS_TABLE};
use crate::error::{Result, SlrError};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const STAGING_EXTENSION: &str = "tmp";

#[derive(Debug, Clone)]
pub struct FileStore {
    table_dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let table_dir = root.as_ref().join(MODELS_TABLE);
        tokio::fs::create_dir_all(&table_dir)
            .await
            .map_err(|e| SlrError::storage(&format!("cannot create {:?}", table_dir), e))?;

        let removed = Self::remove_staging_files(&table_dir)
            .await
            .map_err(|e| SlrError::storage(&format!("cannot scan {:?}", table_dir), e))?;
        if removed > 0 {
            warn!(count = removed, "Removed unfinished model writes");
        }

        info!(path = %table_dir.display(), "Opened file model store");
        Ok(Self { table_dir })
    }

    /// Delete temp files left by inserts that were cancelled mid-write
    async fn remove_staging_files(table_dir: &Path) -> std::io::Result<usize> {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(table_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == STAGING_EXTENSION) {
                tokio::fs::remove_file(&path).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn table_dir(&self) -> &Path {
        &self.table_dir
    }

    /// Path of a record, or `None` for names that cannot be stored keys
    fn record_path(&self, name: &str) -> Option<PathBuf> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.table_dir.join(format!("{}.json", name)))
    }

    async fn write_temp(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await?;
        file.write_all(data).await?;
        file.sync_all().await
    }
}

#[async_trait]
impl ModelStore for FileStore {
    async fn insert(&self, name: &str, params: [f64; 2]) -> Result<DateTime<Utc>> {
        let path = self
            .record_path(name)
            .ok_or_else(|| SlrError::Storage(format!("invalid model name: {:?}", name)))?;

        let record = StoredModelRecord {
            name: name.to_string(),
            params: params.to_vec(),
            creation_time: Utc::now(),
        };
        let data = serde_json::to_vec(&record)
            .map_err(|e| SlrError::storage("cannot serialize model record", e))?;

        let temp_path = path.with_extension(format!("json.{}", STAGING_EXTENSION));
        Self::write_temp(&temp_path, &data)
            .await
            .map_err(|e| SlrError::storage("cannot save model to store", e))?;

        let linked = tokio::fs::hard_link(&temp_path, &path).await;
        // The temp file is only a staging copy either way.
        let _ = tokio::fs::remove_file(&temp_path).await;

        match linked {
            Ok(()) => {
                debug!(name = %name, path = %path.display(), "Model record written");
                Ok(record.creation_time)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(SlrError::Storage(format!(
                "model {} already exists",
                name
            ))),
            Err(e) => Err(SlrError::storage("cannot save model to store", e)),
        }
    }

    async fn read(&self, name: &str) -> Result<StoredModelRecord> {
        let path = self
            .record_path(name)
            .ok_or_else(|| SlrError::ModelNotFound(name.to_string()))?;

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SlrError::ModelNotFound(name.to_string()))
            }
            Err(e) => return Err(SlrError::storage("error loading model from store", e)),
        };

        serde_json::from_slice(&data)
            .map_err(|e| SlrError::storage("error loading parameters from stored record", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).await.unwrap();

        let ts = store.insert("0a1b2c", [2.0, 0.5]).await.unwrap();
        let record = store.read("0a1b2c").await.unwrap();

        assert_eq!(record.name, "0a1b2c");
        assert_eq!(record.params, vec![2.0, 0.5]);
        assert_eq!(record.creation_time, ts);
        assert!(store.table_dir().join("0a1b2c.json").exists());
        assert!(!store.table_dir().join("0a1b2c.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = FileStore::open(temp_dir.path()).await.unwrap();
            store.insert("persisted", [-1.0, 3.0]).await.unwrap();
        }

        let reopened = FileStore::open(temp_dir.path()).await.unwrap();
        let record = reopened.read("persisted").await.unwrap();
        assert_eq!(record.params, vec![-1.0, 3.0]);
    }

    #[tokio::test]
    async fn test_open_removes_unfinished_writes() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = FileStore::open(temp_dir.path()).await.unwrap();
            store.insert("kept", [1.0, 2.0]).await.unwrap();
            tokio::fs::write(store.table_dir().join("cut.json.tmp"), b"{\"name\"")
                .await
                .unwrap();
        }

        let reopened = FileStore::open(temp_dir.path()).await.unwrap();
        assert!(!reopened.table_dir().join("cut.json.tmp").exists());
        assert!(reopened.read("cut").await.unwrap_err().is_not_found());
        assert_eq!(reopened.read("kept").await.unwrap().params, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_duplicate_name_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).await.unwrap();

        store.insert("dup", [1.0, 1.0]).await.unwrap();
        let err = store.insert("dup", [9.0, 9.0]).await.unwrap_err();

        assert!(matches!(err, SlrError::Storage(_)));
        assert_eq!(store.read("dup").await.unwrap().params, vec![1.0, 1.0]);
    }

    #[tokio::test]
    async fn test_missing_and_unsafe_names_are_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).await.unwrap();

        assert!(store.read("absent").await.unwrap_err().is_not_found());
        assert!(store.read("../etc/passwd").await.unwrap_err().is_not_found());
        assert!(store.read("").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).await.unwrap();
        tokio::fs::write(store.table_dir().join("broken.json"), b"{not json")
            .await
            .unwrap();

        let err = store.read("broken").await.unwrap_err();
        assert!(matches!(err, SlrError::Storage(_)));
    }
}
