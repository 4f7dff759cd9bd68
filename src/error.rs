//! Error types for the wallet persistence layer

use thiserror::Error;

/// Main error type for persistence operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database file could not be created or opened
    #[error("Failed to open database: {0}")]
    Open(String),

    /// DDL or DML failure while bringing the schema up to date
    #[error("Migration error: {0}")]
    Migration(String),

    /// Individual read or write failed
    #[error("Query error: {0}")]
    Query(String),

    /// Wallet singleton row is missing or empty
    #[error("Wallet not found in database!")]
    WalletNotFound,

    /// Database was never opened, failed to open, or has been closed
    #[error("Database not open")]
    NotOpen,

    /// Stored schema version is newer than this build understands
    #[error("Unsupported database version: {0}")]
    UnsupportedVersion(u32),

    /// Key-value store read or write failed
    #[error("Key-value store error: {0}")]
    KeyValue(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking database task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Query(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::KeyValue(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::Task(err.to_string())
    }
}

/// Result type alias for persistence operations
pub type Result<T> = std::result::Result<T, StorageError>;
