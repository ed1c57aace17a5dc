//! Flat-file persistence
//!
//! Each store keeps one JSON document on disk and rewrites it whole on every
//! mutation. Read-modify-write cycles are serialised by a per-store async mutex,
//! and writes go through a temp file + rename so readers never see a torn file.

mod feedback;
mod leaderboard;
mod voucher;

pub use feedback::FeedbackLog;
pub use leaderboard::{LeaderboardStore, KEY_SEPARATOR};
pub use voucher::VoucherStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// A JSON document stored in a single file
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, or `T::default()` if the file does not exist yet
    pub async fn load_or_default<T>(&self) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(T::default()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| StorageError::json(&self.path, e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(StorageError::io(&self.path, e)),
        }
    }

    /// Make sure the file exists, writing an empty document if it does not
    pub async fn ensure_exists<T>(&self) -> Result<(), StorageError>
    where
        T: Serialize + Default,
    {
        if tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?
        {
            return Ok(());
        }
        self.save(&T::default()).await
    }

    /// Replace the whole document
    pub async fn save<T: Serialize>(&self, value: &T) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }

        let json =
            serde_json::to_string_pretty(value).map_err(|e| StorageError::json(&self.path, e))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StorageError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let file = JsonFile::new(dir.path().join("nothing.json"));

        let doc: BTreeMap<String, u32> = file.load_or_default().await.unwrap();
        assert!(doc.is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_roundtrips() {
        let dir = TempDir::new().unwrap();
        let file = JsonFile::new(dir.path().join("nested").join("doc.json"));

        let mut doc = BTreeMap::new();
        doc.insert("Friends|joey|1234".to_string(), 12u32);
        file.save(&doc).await.unwrap();

        let loaded: BTreeMap<String, u32> = file.load_or_default().await.unwrap();
        assert_eq!(loaded, doc);
        assert!(!file.path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_ensure_exists_writes_empty_object() {
        let dir = TempDir::new().unwrap();
        let file = JsonFile::new(dir.path().join("vouchers.json"));

        file.ensure_exists::<BTreeMap<String, u32>>().await.unwrap();
        let raw = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(raw.trim(), "{}");
    }

    #[tokio::test]
    async fn test_malformed_document_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result: Result<BTreeMap<String, u32>, _> = JsonFile::new(path).load_or_default().await;
        assert!(matches!(result, Err(StorageError::Json { .. })));
    }
}
