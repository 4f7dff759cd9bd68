//! Main wallet store API
//!
//! [`WalletStore`] is what the application talks to. It owns the database
//! handle and the key-value store and exposes async entry points for the
//! whole session.
//!
//! The have-wallet flag and the database are two independent stores with no
//! shared transaction. Saving writes the wallet json first and sets the flag
//! second; deleting clears the flag first and removes the file second. The
//! flag is therefore a hint that a wallet probably exists, never proof.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use rusqlite::Connection;
use tracing::{debug, error, info};
use crate::config::StoreConfig;
use crate::database::{Database, Payee, Preferences, TransactionDetails};
use crate::database::queries;
use crate::error::{StorageError, Result};
use crate::kvstore::{FileStore, KeyValueStore};

/// Suffixes of SQLite side files removed together with the database
const SIDE_FILE_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// Something that can be persisted as the wallet blob
pub trait WalletSerializer {
    /// Serialized wallet state, stored verbatim
    fn to_json_string(&self) -> String;
}

impl WalletSerializer for str {
    fn to_json_string(&self) -> String {
        self.to_string()
    }
}

impl WalletSerializer for String {
    fn to_json_string(&self) -> String {
        self.clone()
    }
}

/// Log a caught error together with its full details
///
/// Messages passed here must never contain wallet contents.
pub fn report_caught_error(context: &str, err: &StorageError) {
    error!(error = %err, details = ?err, "{}", context);
}

/// Main persistence interface
pub struct WalletStore {
    config: StoreConfig,
    /// Shared handle, `None` until opened or after close/delete
    db: Arc<Mutex<Option<Database>>>,
    kv: Arc<dyn KeyValueStore>,
}

impl WalletStore {
    /// Create a store with a file-backed key-value store in `data_dir`
    pub fn new(config: StoreConfig) -> Self {
        let kv = Arc::new(FileStore::new(config.kv_path()));
        Self::with_kv_store(config, kv)
    }

    /// Create a store with a caller-provided key-value store
    pub fn with_kv_store(config: StoreConfig, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            config,
            db: Arc::new(Mutex::new(None)),
            kv,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Full path of the database file (None for in-memory)
    pub fn database_path(&self) -> Option<PathBuf> {
        (!self.config.in_memory).then(|| self.config.database_path())
    }

    fn lock(db: &Mutex<Option<Database>>) -> Result<MutexGuard<'_, Option<Database>>> {
        db.lock().map_err(|_| StorageError::Task("database lock poisoned".to_string()))
    }

    /// Check if the database is open and migrated
    pub fn is_open(&self) -> bool {
        Self::lock(&self.db).map(|db| db.is_some()).unwrap_or(false)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Open the database and bring its schema up to date
    ///
    /// Failures are logged and swallowed; the store then stays unusable for
    /// the session and every query returns [`StorageError::NotOpen`].
    pub async fn open_database(&self) -> bool {
        match self.try_open_database().await {
            Ok(()) => true,
            Err(err) => {
                report_caught_error("Failed to open DB", &err);
                false
            }
        }
    }

    /// Open the database, returning the failure instead of logging it
    pub async fn try_open_database(&self) -> Result<()> {
        let path = self.database_path();
        let database = tokio::task::spawn_blocking(move || match path {
            Some(path) => Database::initialize(&path),
            None => Database::initialize_in_memory(),
        })
        .await??;

        info!(path = ?database.path(), "Database ready");
        *Self::lock(&self.db)? = Some(database);
        Ok(())
    }

    /// Close the database handle; the file stays on disk
    pub async fn close(&self) {
        let db = Arc::clone(&self.db);
        let closed = tokio::task::spawn_blocking(move || -> Result<()> {
            if let Some(mut database) = Self::lock(&db)?.take() {
                database.close();
            }
            Ok(())
        })
        .await;

        if let Err(err) = closed.map_err(StorageError::from).and_then(|r| r) {
            report_caught_error("Failed to close DB", &err);
        }
    }

    /// Forget the wallet: clear the flag, then remove the database file
    ///
    /// The flag goes first so a failed or interrupted file removal never
    /// leaves the application believing a wallet still exists.
    pub async fn delete_database(&self) {
        self.set_have_wallet(false).await;

        if let Err(err) = self.remove_database_files().await {
            report_caught_error("Failed to delete DB", &err);
        }
    }

    async fn remove_database_files(&self) -> Result<()> {
        self.close().await;

        let Some(path) = self.database_path() else {
            return Ok(());
        };

        let mut paths = vec![path.clone()];
        for suffix in SIDE_FILE_SUFFIXES {
            let mut side = path.clone().into_os_string();
            side.push(suffix);
            paths.push(PathBuf::from(side));
        }

        for path in paths {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "Removed database file"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    // ========================================================================
    // Have-wallet flag
    // ========================================================================

    /// Whether a wallet has been saved; any doubt reads as `false`
    pub async fn have_wallet(&self) -> bool {
        match self.kv.get_item(&self.config.have_wallet_key()).await {
            Ok(Some(value)) => value == "true",
            Ok(None) => false,
            Err(err) => {
                report_caught_error("Error determining if we have data", &err);
                false
            }
        }
    }

    /// Store the have-wallet flag; failures are logged only
    pub async fn set_have_wallet(&self, have_wallet: bool) {
        let key = self.config.have_wallet_key();
        if let Err(err) = self.kv.set_item(&key, &have_wallet.to_string()).await {
            report_caught_error("Failed to save have wallet status", &err);
        }
    }

    // ========================================================================
    // Wallet
    // ========================================================================

    /// Run `f` against the open connection on the blocking pool
    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let guard = Self::lock(&db)?;
            let database = guard.as_ref().ok_or(StorageError::NotOpen)?;
            f(database.connection()?)
        })
        .await?
    }

    /// Persist the wallet and mark that a wallet exists
    ///
    /// Errors are logged and swallowed. The flag is only set after the json
    /// has been written.
    pub async fn save_to_database<W: WalletSerializer + ?Sized>(&self, wallet: &W) {
        let json = wallet.to_json_string();

        if let Err(err) = self.save_wallet(json).await {
            report_caught_error("Err saving wallet", &err);
            return;
        }

        self.set_have_wallet(true).await;
    }

    /// Overwrite the stored wallet json without touching the flag
    pub async fn save_wallet(&self, json: String) -> Result<()> {
        self.with_connection(move |conn| queries::save_wallet(conn, &json)).await
    }

    /// Load the stored wallet json
    pub async fn load_wallet(&self) -> Result<String> {
        let result = self.with_connection(queries::load_wallet).await;
        if let Err(err) = &result {
            if !matches!(err, StorageError::WalletNotFound) {
                report_caught_error("Failed to load wallet", err);
            }
        }
        result
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    /// Overwrite all stored preferences
    pub async fn save_preferences(&self, prefs: Preferences) -> Result<()> {
        self.with_connection(move |conn| queries::save_preferences(conn, &prefs)).await
    }

    /// Load preferences, `None` if the singleton row is missing
    pub async fn load_preferences(&self) -> Result<Option<Preferences>> {
        self.with_connection(queries::load_preferences).await
    }

    // ========================================================================
    // Payees
    // ========================================================================

    /// Append a payee to the address book; duplicates are not checked
    pub async fn add_payee(&self, payee: Payee) -> Result<()> {
        self.with_connection(move |conn| queries::add_payee(conn, &payee)).await
    }

    /// Remove every payee with this nickname, returning how many were removed
    pub async fn remove_payee(&self, nickname: &str) -> Result<usize> {
        let nickname = nickname.to_string();
        self.with_connection(move |conn| queries::remove_payee(conn, &nickname)).await
    }

    /// Load every payee (no ordering guarantee)
    pub async fn load_payees(&self) -> Result<Vec<Payee>> {
        self.with_connection(queries::get_payees).await
    }

    // ========================================================================
    // Transaction details
    // ========================================================================

    /// Append transaction details; the same hash may be stored repeatedly
    pub async fn add_transaction_details(&self, details: TransactionDetails) -> Result<()> {
        self.with_connection(move |conn| queries::add_transaction_details(conn, &details)).await
    }

    /// Load every stored transaction detail entry
    pub async fn load_transaction_details(&self) -> Result<Vec<TransactionDetails>> {
        self.with_connection(queries::get_transaction_details).await
    }

    /// All entries stored for `hash`, oldest first
    pub async fn find_transaction_details(&self, hash: &str) -> Result<Vec<TransactionDetails>> {
        let hash = hash.to_string();
        self.with_connection(move |conn| queries::get_transaction_details_by_hash(conn, &hash))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kvstore::MemoryStore;

    async fn open_store() -> WalletStore {
        let store = WalletStore::with_kv_store(
            StoreConfig::in_memory("TurtleCoin"),
            Arc::new(MemoryStore::new()),
        );
        assert!(store.open_database().await);
        store
    }

    #[tokio::test]
    async fn test_queries_before_open() {
        let store = WalletStore::with_kv_store(
            StoreConfig::in_memory("TurtleCoin"),
            Arc::new(MemoryStore::new()),
        );
        assert!(!store.is_open());
        assert!(matches!(store.load_wallet().await, Err(StorageError::NotOpen)));
        assert!(matches!(store.load_payees().await, Err(StorageError::NotOpen)));
    }

    #[tokio::test]
    async fn test_save_to_database_sets_flag() {
        let store = open_store().await;
        assert!(!store.have_wallet().await);

        store.save_to_database("{a:1}").await;

        assert!(store.have_wallet().await);
        assert_eq!(store.load_wallet().await.unwrap(), "{a:1}");
    }

    #[tokio::test]
    async fn test_failed_save_leaves_flag_unset() {
        let store = WalletStore::with_kv_store(
            StoreConfig::in_memory("TurtleCoin"),
            Arc::new(MemoryStore::new()),
        );

        store.save_to_database("{a:1}").await;

        assert!(!store.have_wallet().await);
    }

    #[tokio::test]
    async fn test_have_wallet_parses_flag() {
        let kv = Arc::new(MemoryStore::new());
        let store = WalletStore::with_kv_store(StoreConfig::in_memory("TurtleCoin"), kv.clone());

        kv.set_item("TurtleCoinHaveWallet", "yes").await.unwrap();
        assert!(!store.have_wallet().await);

        store.set_have_wallet(true).await;
        assert_eq!(kv.get_item("TurtleCoinHaveWallet").await.unwrap().as_deref(), Some("true"));
        assert!(store.have_wallet().await);
    }

    #[tokio::test]
    async fn test_delete_in_memory_database() {
        let store = open_store().await;
        store.save_to_database("{a:1}").await;

        store.delete_database().await;

        assert!(!store.have_wallet().await);
        assert!(!store.is_open());
    }

    #[tokio::test]
    async fn test_wallet_serializer_for_custom_type() {
        struct FakeWallet {
            height: u64,
        }

        impl WalletSerializer for FakeWallet {
            fn to_json_string(&self) -> String {
                format!("{{\"height\":{}}}", self.height)
            }
        }

        let store = open_store().await;
        store.save_to_database(&FakeWallet { height: 42 }).await;
        assert_eq!(store.load_wallet().await.unwrap(), "{\"height\":42}");
    }
}
