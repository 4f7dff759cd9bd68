//! Store configuration

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::{DATABASE_FILENAME, HAVE_WALLET_KEY_SUFFIX, KV_FILENAME};

/// Where and under which names the store keeps its data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the database and key-value files
    pub data_dir: PathBuf,
    /// Database file name inside `data_dir`
    pub database_name: String,
    /// Key-value store file name inside `data_dir`
    pub kv_file_name: String,
    /// Coin/app identity, prefixes the have-wallet key
    pub coin_name: String,
    /// Keep the database in memory instead of `data_dir`
    pub in_memory: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            database_name: DATABASE_FILENAME.to_string(),
            kv_file_name: KV_FILENAME.to_string(),
            coin_name: crate::DEFAULT_COIN_NAME.to_string(),
            in_memory: false,
        }
    }
}

impl StoreConfig {
    /// Configuration for a data directory with default file names
    pub fn new(data_dir: &Path, coin_name: &str) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            coin_name: coin_name.to_string(),
            ..Self::default()
        }
    }

    /// Configuration for an in-memory database
    pub fn in_memory(coin_name: &str) -> Self {
        Self {
            coin_name: coin_name.to_string(),
            in_memory: true,
            ..Self::default()
        }
    }

    /// Full path of the database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_name)
    }

    /// Full path of the key-value store file
    pub fn kv_path(&self) -> PathBuf {
        self.data_dir.join(&self.kv_file_name)
    }

    /// Key of the have-wallet flag, e.g. `TurtleCoinHaveWallet`
    pub fn have_wallet_key(&self) -> String {
        format!("{}{}", self.coin_name, HAVE_WALLET_KEY_SUFFIX)
    }
}
