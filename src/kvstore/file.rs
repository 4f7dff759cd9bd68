//! JSON file backed key-value store

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::warn;
use crate::error::{StorageError, Result};
use super::KeyValueStore;

/// Key-value store persisted as one JSON object in a file
///
/// Writes replace the whole file atomically (temp file + rename), so a crash
/// leaves either the old or the new contents. A missing or empty file reads
/// as an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within the process
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_bytes(&self) -> Result<Vec<u8>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(StorageError::KeyValue(format!("{}: {}", self.path.display(), err))),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let bytes = self.read_bytes().await?;
        if bytes.is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Current contents for a read-modify-write; an unparsable file is
    /// replaced rather than blocking every later write
    async fn read_for_write(&self) -> Result<BTreeMap<String, String>> {
        let bytes = self.read_bytes().await?;
        if bytes.is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_slice(&bytes) {
            Ok(items) => Ok(items),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Discarding unreadable key-value file");
                Ok(BTreeMap::new())
            }
        }
    }

    async fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let data = serde_json::to_vec_pretty(items)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || replace_file(&path, &data)).await?
    }
}

fn replace_file(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StorageError::KeyValue(e.to_string()))?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_for_write().await?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items).await
    }
}
