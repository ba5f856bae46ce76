//! Local filesystem storage backend.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{
    BINDINGS_FILE, BindingRecord, DEPARTMENTS_FILE, DepartmentRecord, NOTICES_FILE, NoticeRecord,
    StateStore,
};

/// JSON files under a storage directory, written atomically.
#[derive(Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StateStore for LocalStore {
    async fn load_departments(&self) -> Result<DepartmentRecord> {
        Ok(self.read_json(DEPARTMENTS_FILE).await?.unwrap_or_default())
    }

    async fn load_notices(&self) -> Result<NoticeRecord> {
        Ok(self.read_json(NOTICES_FILE).await?.unwrap_or_default())
    }

    async fn save_notices(&self, record: &NoticeRecord) -> Result<()> {
        self.write_json(NOTICES_FILE, record).await
    }

    async fn load_bindings(&self) -> Result<BindingRecord> {
        Ok(self.read_json(BINDINGS_FILE).await?.unwrap_or_default())
    }

    async fn save_bindings(&self, record: &BindingRecord) -> Result<()> {
        self.write_json(BINDINGS_FILE, record).await
    }
}
