//! # walletdb
//!
//! Local persistence layer for a cryptocurrency wallet application.
//!
//! ## Features
//!
//! - SQLite storage for the serialized wallet, preferences, payees and
//!   transaction details
//! - Idempotent schema creation with version-gated additive migrations
//! - Have-wallet flag kept in a separate key-value store, readable before
//!   the database is opened
//! - Async API on top of tokio
//!
//! ## Example
//!
//! ```no_run
//! use walletdb::{StoreConfig, WalletStore};
//! use std::path::Path;
//!
//! # async fn run() {
//! let store = WalletStore::new(StoreConfig::new(Path::new("/path/to/data"), "TurtleCoin"));
//!
//! if store.open_database().await && store.have_wallet().await {
//!     let json = store.load_wallet().await.unwrap();
//!     println!("wallet is {} bytes", json.len());
//! }
//! # }
//! ```

pub mod config;
pub mod database;
pub mod business;
pub mod kvstore;
pub mod error;

// Re-export main types
pub use error::{StorageError, Result};
pub use config::StoreConfig;
pub use database::{Database, Payee, Preferences, TransactionDetails, CURRENT_VERSION};
pub use business::{WalletSerializer, WalletStore};
pub use kvstore::{FileStore, KeyValueStore, MemoryStore};

/// Database filename
pub const DATABASE_FILENAME: &str = "data.DB";

/// Key-value store filename
pub const KV_FILENAME: &str = "storage.json";

/// Coin name used when none is configured
pub const DEFAULT_COIN_NAME: &str = "TurtleCoin";

/// Appended to the coin name to form the have-wallet key
pub const HAVE_WALLET_KEY_SUFFIX: &str = "HaveWallet";
