//! Database connection management

use std::path::{Path, PathBuf};
use rusqlite::Connection;
use tracing::debug;
use crate::error::{StorageError, Result};
use super::migrations;

/// Database connection wrapper
///
/// Owns the single SQLite handle for a session. Repository functions in
/// [`super::queries`] borrow the connection from here; nothing else holds it.
pub struct Database {
    /// Path to the database file (None for in-memory)
    path: Option<PathBuf>,
    /// SQLite connection
    conn: Option<Connection>,
}

impl Database {
    /// Open (creating if absent) a database at the specified path
    ///
    /// Missing parent directories are created. The file is probed with a
    /// read so that unreadable or corrupt files fail here rather than on
    /// first use.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Open(format!("{}: {}", parent.display(), e)))?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| StorageError::Open(format!("{}: {}", path.display(), e)))?;

        conn.query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))
            .map_err(|e| StorageError::Open(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Opened database");

        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Some(conn),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Open(e.to_string()))?;
        Ok(Self { path: None, conn: Some(conn) })
    }

    /// Open a database at the specified path and bring its schema up to date
    pub fn initialize(path: &Path) -> Result<Self> {
        let mut db = Self::open(path)?;
        migrations::ensure_schema(db.connection_mut()?)?;
        Ok(db)
    }

    /// Open an in-memory database with the current schema
    pub fn initialize_in_memory() -> Result<Self> {
        let mut db = Self::open_in_memory()?;
        migrations::ensure_schema(db.connection_mut()?)?;
        Ok(db)
    }

    /// Get a reference to the connection
    pub fn connection(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(StorageError::NotOpen)
    }

    /// Get a mutable reference to the connection
    pub fn connection_mut(&mut self) -> Result<&mut Connection> {
        self.conn.as_mut().ok_or(StorageError::NotOpen)
    }

    /// Get the database path (None for in-memory)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the database connection
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, err)) = conn.close() {
                tracing::warn!(error = %err, "Database did not close cleanly");
            }
        }
    }

    /// Check if database is open
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.close();
    }
}
