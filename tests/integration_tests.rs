//! Integration tests for walletdb
//!
//! These tests run the store against real files in a temporary directory.

use std::path::Path;
use std::sync::Arc;
use rusqlite::Connection;
use tempfile::TempDir;
use walletdb::database::migrations;
use walletdb::{
    FileStore, KeyValueStore, MemoryStore, Payee, Preferences, StorageError, StoreConfig,
    TransactionDetails, WalletStore, CURRENT_VERSION,
};

const COIN: &str = "TurtleCoin";

fn store_in(dir: &Path) -> WalletStore {
    WalletStore::new(StoreConfig::new(dir, COIN))
}

/// Open a fresh store in a temp directory
async fn setup_store() -> (WalletStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = store_in(temp_dir.path());
    assert!(store.open_database().await, "Failed to open database");
    (store, temp_dir)
}

#[tokio::test]
async fn test_fresh_database_schema() {
    let (store, temp_dir) = setup_store().await;
    store.close().await;

    let conn = Connection::open(temp_dir.path().join("data.DB")).unwrap();
    assert_eq!(migrations::get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    for table in ["wallet", "preferences", "payees", "transactiondetails"] {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1, "missing table {}", table);
    }

    let json: String = conn
        .query_row("SELECT json FROM wallet WHERE id = 0", [], |row| row.get(0))
        .unwrap();
    assert_eq!(json, "");
}

#[tokio::test]
async fn test_default_preferences() {
    let (store, _temp_dir) = setup_store().await;

    let prefs = store.load_preferences().await.unwrap().unwrap();
    assert_eq!(prefs, Preferences::default());
    assert_eq!(prefs.currency, "usd");
    assert_eq!(prefs.theme, "darkMode");
    assert!(prefs.auto_optimize);
}

#[tokio::test]
async fn test_reopen_keeps_data() {
    let (store, temp_dir) = setup_store().await;
    store.save_to_database("{a:1}").await;
    store
        .save_preferences(Preferences { currency: "eur".to_string(), ..Preferences::default() })
        .await
        .unwrap();
    store.close().await;

    let store = store_in(temp_dir.path());
    assert!(store.open_database().await);
    assert!(store.open_database().await);

    assert_eq!(store.load_wallet().await.unwrap(), "{a:1}");
    assert_eq!(store.load_preferences().await.unwrap().unwrap().currency, "eur");
    assert!(store.have_wallet().await);
}

#[tokio::test]
async fn test_upgrade_from_v0_database() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("data.DB");

    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE wallet (id INTEGER PRIMARY KEY, json TEXT);
            INSERT INTO wallet (id, json) VALUES (0, '{"old":true}');
            CREATE TABLE preferences (
                id INTEGER PRIMARY KEY,
                currency TEXT,
                notificationsenabled BOOLEAN,
                scancoinbasetransactions BOOLEAN,
                limitdata BOOLEAN,
                theme TEXT,
                pinconfirmation BOOLEAN
            );
            INSERT INTO preferences VALUES (0, 'gbp', 0, 1, 1, 'lightMode', 1);
            CREATE TABLE payees (nickname TEXT, address TEXT, paymentid TEXT);
            INSERT INTO payees VALUES ('bob', 'addr1', NULL);
            "#,
        )
        .unwrap();
    }

    let store = store_in(temp_dir.path());
    assert!(store.open_database().await);

    let prefs = store.load_preferences().await.unwrap().unwrap();
    assert_eq!(
        prefs,
        Preferences {
            currency: "gbp".to_string(),
            notifications_enabled: false,
            scan_coinbase_transactions: true,
            limit_data: true,
            theme: "lightMode".to_string(),
            auth_confirmation: true,
            auto_optimize: true,
        }
    );
    assert_eq!(store.load_wallet().await.unwrap(), r#"{"old":true}"#);
    assert_eq!(store.load_payees().await.unwrap(), vec![Payee::new("bob", "addr1")]);
    assert!(store.load_transaction_details().await.unwrap().is_empty());

    store.close().await;
    let conn = Connection::open(&db_path).unwrap();
    assert_eq!(migrations::get_schema_version(&conn).unwrap(), 1);
}

#[tokio::test]
async fn test_newer_database_is_not_opened() {
    let temp_dir = TempDir::new().unwrap();
    {
        let conn = Connection::open(temp_dir.path().join("data.DB")).unwrap();
        conn.execute_batch("PRAGMA user_version = 99").unwrap();
    }

    let store = store_in(temp_dir.path());
    assert!(!store.open_database().await);
    assert!(!store.is_open());

    let store = store_in(temp_dir.path());
    assert!(matches!(
        store.try_open_database().await,
        Err(StorageError::UnsupportedVersion(99))
    ));
}

#[tokio::test]
async fn test_open_failure_is_swallowed() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();

    let store = store_in(&blocker);
    assert!(!store.open_database().await);
    assert!(matches!(store.load_wallet().await, Err(StorageError::NotOpen)));
}

#[tokio::test]
async fn test_wallet_roundtrip_and_missing_row() {
    let (store, temp_dir) = setup_store().await;

    assert!(matches!(store.load_wallet().await, Err(StorageError::WalletNotFound)));

    store.save_wallet("{a:1}".to_string()).await.unwrap();
    assert_eq!(store.load_wallet().await.unwrap(), "{a:1}");

    let conn = Connection::open(temp_dir.path().join("data.DB")).unwrap();
    conn.execute("DELETE FROM wallet WHERE id = 0", []).unwrap();
    drop(conn);

    let err = store.load_wallet().await.unwrap_err();
    assert_eq!(err.to_string(), "Wallet not found in database!");
}

#[tokio::test]
async fn test_preferences_all_toggled() {
    let (store, _temp_dir) = setup_store().await;

    let toggled = Preferences {
        currency: "btc".to_string(),
        notifications_enabled: false,
        scan_coinbase_transactions: true,
        limit_data: true,
        theme: "lightMode".to_string(),
        auth_confirmation: true,
        auto_optimize: false,
    };

    store.save_preferences(toggled.clone()).await.unwrap();
    assert_eq!(store.load_preferences().await.unwrap(), Some(toggled));

    store.save_preferences(Preferences::default()).await.unwrap();
    assert_eq!(store.load_preferences().await.unwrap(), Some(Preferences::default()));
}

#[tokio::test]
async fn test_payee_add_remove() {
    let (store, _temp_dir) = setup_store().await;
    assert!(store.load_payees().await.unwrap().is_empty());

    store.add_payee(Payee::new("bob", "addr1")).await.unwrap();
    store
        .add_payee(Payee::new("carol", "addr2").with_payment_id("f00d"))
        .await
        .unwrap();

    let payees = store.load_payees().await.unwrap();
    assert!(payees.contains(&Payee::new("bob", "addr1")));
    assert_eq!(payees.len(), 2);

    assert_eq!(store.remove_payee("bob").await.unwrap(), 1);
    let payees = store.load_payees().await.unwrap();
    assert!(!payees.iter().any(|p| p.nickname == "bob"));
    assert_eq!(payees, vec![Payee::new("carol", "addr2").with_payment_id("f00d")]);
}

#[tokio::test]
async fn test_duplicate_transaction_details() {
    let (store, _temp_dir) = setup_store().await;

    let details = TransactionDetails {
        hash: "ab12".to_string(),
        memo: "rent".to_string(),
        address: "addr1".to_string(),
        payee: "bob".to_string(),
    };
    store.add_transaction_details(details.clone()).await.unwrap();
    store
        .add_transaction_details(TransactionDetails { memo: "rent again".to_string(), ..details.clone() })
        .await
        .unwrap();

    let all = store.load_transaction_details().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|d| d.hash == "ab12"));

    let found = store.find_transaction_details("ab12").await.unwrap();
    assert_eq!(found.first(), Some(&details));
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn test_have_wallet_lifecycle() {
    let (store, temp_dir) = setup_store().await;
    assert!(!store.have_wallet().await);

    store.set_have_wallet(true).await;
    assert!(store.have_wallet().await);

    // Flag lives outside the database and survives a new store instance
    let kv = FileStore::new(temp_dir.path().join("storage.json"));
    assert_eq!(kv.get_item("TurtleCoinHaveWallet").await.unwrap().as_deref(), Some("true"));

    store.delete_database().await;
    assert!(!store.have_wallet().await);
    assert!(!temp_dir.path().join("data.DB").exists());
    assert!(!store.is_open());
}

#[tokio::test]
async fn test_delete_then_reopen_is_fresh() {
    let (store, temp_dir) = setup_store().await;
    store.save_to_database("{a:1}").await;
    store.add_payee(Payee::new("bob", "addr1")).await.unwrap();

    store.delete_database().await;

    let store = store_in(temp_dir.path());
    assert!(!store.have_wallet().await);
    assert!(store.open_database().await);
    assert!(matches!(store.load_wallet().await, Err(StorageError::WalletNotFound)));
    assert!(store.load_payees().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_without_database_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_in(temp_dir.path());
    store.set_have_wallet(true).await;

    store.delete_database().await;

    assert!(!store.have_wallet().await);
}

#[tokio::test]
async fn test_unreadable_flag_reads_false() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("storage.json"), b"{broken").unwrap();

    let store = store_in(temp_dir.path());
    assert!(!store.have_wallet().await);
}

#[tokio::test]
async fn test_save_recovers_from_corrupt_flag_file() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("storage.json"), b"{broken").unwrap();

    let store = store_in(temp_dir.path());
    assert!(store.open_database().await);
    store.save_to_database("{a:1}").await;

    assert!(store.have_wallet().await);
    assert_eq!(store.load_wallet().await.unwrap(), "{a:1}");
}

#[tokio::test]
async fn test_flag_keys_are_per_coin() {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let turtle = WalletStore::with_kv_store(StoreConfig::in_memory("TurtleCoin"), kv.clone());
    let other = WalletStore::with_kv_store(StoreConfig::in_memory("OtherCoin"), kv);

    turtle.set_have_wallet(true).await;

    assert!(turtle.have_wallet().await);
    assert!(!other.have_wallet().await);
}
