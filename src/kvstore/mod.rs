//! Lightweight async key-value storage
//!
//! Holds small string values outside the relational database, so they can be
//! read before the database is opened. The wallet store keeps exactly one
//! entry here: the have-wallet flag.

pub mod file;

use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::RwLock;
use crate::error::Result;

pub use file::FileStore;

/// Async string key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value for `key`, `None` if absent
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Set `key` to `value`, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
