//! Database schema definitions
//!
//! Base tables are created with the columns of schema version 0. Columns
//! introduced later are added by the migrations in [`super::migrations`].

/// SQL to create the wallet table (singleton row id = 0)
pub const CREATE_WALLET_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS wallet (
    id              INTEGER PRIMARY KEY,
    json            TEXT
)
"#;

/// SQL to create the preferences table at version 0 (singleton row id = 0)
pub const CREATE_PREFERENCES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS preferences (
    id                          INTEGER PRIMARY KEY,
    currency                    TEXT,
    notificationsenabled        BOOLEAN,
    scancoinbasetransactions    BOOLEAN,
    limitdata                   BOOLEAN,
    theme                       TEXT,
    pinconfirmation             BOOLEAN
)
"#;

/// SQL to create the payees (address book) table
pub const CREATE_PAYEES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS payees (
    nickname        TEXT,
    address         TEXT,
    paymentid       TEXT
)
"#;

/// SQL to create the transaction details table
pub const CREATE_TRANSACTION_DETAILS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transactiondetails (
    hash            TEXT,
    memo            TEXT,
    address         TEXT,
    payee           TEXT
)
"#;

/// All table creation statements in order
pub const CREATE_ALL_TABLES: &[&str] = &[
    CREATE_WALLET_TABLE,
    CREATE_PREFERENCES_TABLE,
    CREATE_PAYEES_TABLE,
    CREATE_TRANSACTION_DETAILS_TABLE,
];

/// Table names guaranteed to exist after schema setup
pub const ALL_TABLE_NAMES: &[&str] = &["wallet", "preferences", "payees", "transactiondetails"];

/// Seed the wallet slot that later saves overwrite by primary key
pub const SEED_WALLET: &str = r#"
INSERT OR IGNORE INTO wallet (id, json)
VALUES (0, '')
"#;

/// Seed default preferences; requires every column of the current version
pub const SEED_PREFERENCES: &str = r#"
INSERT OR IGNORE INTO preferences
    (id, currency, notificationsenabled, scancoinbasetransactions, limitdata, theme, pinconfirmation, autooptimize)
VALUES
    (0, 'usd', 1, 0, 0, 'darkMode', 0, 1)
"#;

/// Singleton seed statements, run after all column alterations
pub const SEED_ALL_ROWS: &[&str] = &[SEED_WALLET, SEED_PREFERENCES];
