//! Schema lifecycle and version-gated migrations
//!
//! The schema version lives in `PRAGMA user_version`. Every open runs
//! [`ensure_schema`], which creates missing tables, applies the additive
//! alterations of each pending [`Migration`], seeds the singleton rows,
//! backfills new columns and finally stamps [`CURRENT_VERSION`], all inside
//! one transaction. The version stamp is the last statement, so an aborted
//! run leaves the old version behind and the same steps are retried on the
//! next open.
//!
//! Adding a schema change means bumping [`CURRENT_VERSION`] and appending one
//! record to [`MIGRATIONS`]. Version numbers are never reused and alterations
//! are additive only.

use rusqlite::Connection;
use tracing::{info, warn};
use crate::error::{StorageError, Result};
use super::schema;

/// Current database schema version
pub const CURRENT_VERSION: u32 = 1;

/// One step of the upgrade path
pub struct Migration {
    /// Version this migration upgrades from
    pub from_version: u32,
    /// Version this migration upgrades to
    pub to_version: u32,
    /// Short human-readable summary, used in logs
    pub description: &'static str,
    /// Additive DDL, run before the singleton rows are seeded
    pub alter: fn(&Connection) -> Result<()>,
    /// Fills new columns on existing rows, run after seeding
    pub backfill: fn(&Connection) -> Result<()>,
}

/// Ordered upgrade path up to [`CURRENT_VERSION`]
pub const MIGRATIONS: &[Migration] = &[Migration {
    from_version: 0,
    to_version: 1,
    description: "add preferences.autooptimize",
    alter: add_auto_optimize_column,
    backfill: backfill_auto_optimize,
}];

/// v0 -> v1: auto optimize preference
fn add_auto_optimize_column(conn: &Connection) -> Result<()> {
    if !has_column(conn, "preferences", "autooptimize")? {
        conn.execute("ALTER TABLE preferences ADD COLUMN autooptimize BOOLEAN", [])?;
    }
    Ok(())
}

fn backfill_auto_optimize(conn: &Connection) -> Result<()> {
    conn.execute(
        "UPDATE preferences SET autooptimize = 1 WHERE id = 0 AND autooptimize IS NULL",
        [],
    )?;
    Ok(())
}

/// Migrations that still have to run for a database at `current_version`
pub fn pending_migrations(current_version: u32) -> Vec<&'static Migration> {
    MIGRATIONS
        .iter()
        .filter(|m| m.from_version >= current_version && m.to_version <= CURRENT_VERSION)
        .collect()
}

/// Check if a stored version can be opened by this build
pub fn is_version_compatible(version: u32) -> bool {
    version <= CURRENT_VERSION
}

/// Read the schema version from `PRAGMA user_version`
pub fn get_schema_version(conn: &Connection) -> Result<u32> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(u32::try_from(version).unwrap_or(0))
}

/// Write the schema version to `PRAGMA user_version`
pub fn set_schema_version(conn: &Connection, version: u32) -> Result<()> {
    // PRAGMA does not accept bound parameters
    conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
    Ok(())
}

/// Check whether `table` has a column named `column`
pub fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Bring the schema to [`CURRENT_VERSION`]
///
/// Safe to call on every open: table creation is `IF NOT EXISTS`, column
/// alterations are gated on the stored version (and on the column being
/// absent), seeding is insert-if-absent. Returns the version the database
/// was at before the call.
pub fn ensure_schema(conn: &mut Connection) -> Result<u32> {
    let stored = match get_schema_version(conn) {
        Ok(version) => version,
        Err(err) => {
            warn!(error = %err, "Could not read schema version, assuming 0");
            0
        }
    };

    if !is_version_compatible(stored) {
        return Err(StorageError::UnsupportedVersion(stored));
    }

    let pending = pending_migrations(stored);
    if !pending.is_empty() {
        info!(from = stored, to = CURRENT_VERSION, steps = pending.len(), "Migrating database schema");
    }

    let tx = conn.transaction().map_err(|e| StorageError::Migration(e.to_string()))?;
    apply_schema(&tx, &pending).map_err(into_migration_error)?;
    tx.commit().map_err(|e| StorageError::Migration(e.to_string()))?;

    Ok(stored)
}

/// Run every schema step against an open transaction
fn apply_schema(conn: &Connection, pending: &[&'static Migration]) -> Result<()> {
    for sql in schema::CREATE_ALL_TABLES {
        conn.execute(sql, [])?;
    }

    for migration in pending {
        info!(from = migration.from_version, to = migration.to_version, "{}", migration.description);
        (migration.alter)(conn)?;
    }

    for sql in schema::SEED_ALL_ROWS {
        conn.execute(sql, [])?;
    }

    for migration in pending {
        (migration.backfill)(conn)?;
    }

    let missing = missing_tables(conn)?;
    if !missing.is_empty() {
        return Err(StorageError::Migration(format!("missing tables: {}", missing.join(", "))));
    }

    set_schema_version(conn, CURRENT_VERSION)
}

/// Names from [`schema::ALL_TABLE_NAMES`] that do not exist as tables
pub fn missing_tables(conn: &Connection) -> Result<Vec<&'static str>> {
    let mut missing = Vec::new();
    for name in schema::ALL_TABLE_NAMES {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            [*name],
            |row| row.get(0),
        )?;
        if count == 0 {
            missing.push(*name);
        }
    }
    Ok(missing)
}

fn into_migration_error(err: StorageError) -> StorageError {
    match err {
        StorageError::Query(msg) => StorageError::Migration(msg),
        other => other,
    }
}
