//! SQL query operations for database access
//!
//! Every function borrows the connection owned by [`super::Database`] and
//! assumes [`super::migrations::ensure_schema`] has already run on it.
//! Writes run inside a transaction; reads are single statements.

use rusqlite::{Connection, OptionalExtension, Row, params};
use crate::error::{StorageError, Result};
use super::models::{Payee, Preferences, TransactionDetails};

/// Primary key of the singleton wallet and preferences rows
pub const SINGLETON_ID: i64 = 0;

fn as_flag(value: bool) -> i64 {
    i64::from(value)
}

fn flag_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    Ok(row.get::<_, Option<i64>>(idx)? == Some(1))
}

fn text_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

// ============================================================================
// Wallet queries
// ============================================================================

/// Overwrite the stored wallet json
pub fn save_wallet(conn: &Connection, json: &str) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO wallet (id, json) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET json = excluded.json",
        params![SINGLETON_ID, json],
    )?;
    tx.commit()?;
    Ok(())
}

/// Load the stored wallet json
///
/// Returns [`StorageError::WalletNotFound`] if the row is missing or still
/// holds the empty seed value.
pub fn load_wallet(conn: &Connection) -> Result<String> {
    let json: Option<Option<String>> = conn
        .query_row(
            "SELECT json FROM wallet WHERE id = ?",
            [SINGLETON_ID],
            |row| row.get(0),
        )
        .optional()?;

    match json.flatten() {
        Some(json) if !json.is_empty() => Ok(json),
        _ => Err(StorageError::WalletNotFound),
    }
}

// ============================================================================
// Preferences queries
// ============================================================================

/// Overwrite all preference fields
pub fn save_preferences(conn: &Connection, prefs: &Preferences) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO preferences
            (id, currency, notificationsenabled, scancoinbasetransactions, limitdata, theme, pinconfirmation, autooptimize)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            currency = excluded.currency,
            notificationsenabled = excluded.notificationsenabled,
            scancoinbasetransactions = excluded.scancoinbasetransactions,
            limitdata = excluded.limitdata,
            theme = excluded.theme,
            pinconfirmation = excluded.pinconfirmation,
            autooptimize = excluded.autooptimize",
        params![
            SINGLETON_ID,
            prefs.currency,
            as_flag(prefs.notifications_enabled),
            as_flag(prefs.scan_coinbase_transactions),
            as_flag(prefs.limit_data),
            prefs.theme,
            as_flag(prefs.auth_confirmation),
            as_flag(prefs.auto_optimize),
        ],
    )?;
    tx.commit()?;
    Ok(())
}

/// Load preferences, `None` if the singleton row is missing
pub fn load_preferences(conn: &Connection) -> Result<Option<Preferences>> {
    let prefs = conn
        .query_row(
            "SELECT currency, notificationsenabled, scancoinbasetransactions, limitdata,
                    theme, pinconfirmation, autooptimize
             FROM preferences WHERE id = ?",
            [SINGLETON_ID],
            |row| {
                Ok(Preferences {
                    currency: text_at(row, 0)?,
                    notifications_enabled: flag_at(row, 1)?,
                    scan_coinbase_transactions: flag_at(row, 2)?,
                    limit_data: flag_at(row, 3)?,
                    theme: text_at(row, 4)?,
                    auth_confirmation: flag_at(row, 5)?,
                    auto_optimize: flag_at(row, 6)?,
                })
            },
        )
        .optional()?;
    Ok(prefs)
}

// ============================================================================
// Payee queries
// ============================================================================

/// Append a payee; duplicates are not checked
pub fn add_payee(conn: &Connection, payee: &Payee) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO payees (nickname, address, paymentid) VALUES (?, ?, ?)",
        params![payee.nickname, payee.address, payee.payment_id],
    )?;
    tx.commit()?;
    Ok(())
}

/// Delete every payee with exactly this nickname, returning the row count
pub fn remove_payee(conn: &Connection, nickname: &str) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let removed = tx.execute("DELETE FROM payees WHERE nickname = ?", [nickname])?;
    tx.commit()?;
    Ok(removed)
}

/// Get all payees (no ordering guarantee)
pub fn get_payees(conn: &Connection) -> Result<Vec<Payee>> {
    let mut stmt = conn.prepare("SELECT nickname, address, paymentid FROM payees")?;

    let payees = stmt.query_map([], |row| {
        Ok(Payee {
            nickname: text_at(row, 0)?,
            address: text_at(row, 1)?,
            payment_id: row.get(2)?,
        })
    })?;

    payees.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
}

// ============================================================================
// Transaction details queries
// ============================================================================

/// Append transaction details; the same hash may be stored repeatedly
pub fn add_transaction_details(conn: &Connection, details: &TransactionDetails) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO transactiondetails (hash, memo, address, payee) VALUES (?, ?, ?, ?)",
        params![details.hash, details.memo, details.address, details.payee],
    )?;
    tx.commit()?;
    Ok(())
}

fn map_transaction_details(row: &Row<'_>) -> rusqlite::Result<TransactionDetails> {
    Ok(TransactionDetails {
        hash: text_at(row, 0)?,
        memo: text_at(row, 1)?,
        address: text_at(row, 2)?,
        payee: text_at(row, 3)?,
    })
}

/// Get all transaction details (no ordering guarantee)
pub fn get_transaction_details(conn: &Connection) -> Result<Vec<TransactionDetails>> {
    let mut stmt = conn.prepare("SELECT hash, memo, address, payee FROM transactiondetails")?;
    let rows = stmt.query_map([], map_transaction_details)?;
    rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
}

/// Get every stored entry for one transaction hash, oldest insert first
pub fn get_transaction_details_by_hash(conn: &Connection, hash: &str) -> Result<Vec<TransactionDetails>> {
    let mut stmt = conn.prepare(
        "SELECT hash, memo, address, payee FROM transactiondetails WHERE hash = ? ORDER BY rowid",
    )?;
    let rows = stmt.query_map([hash], map_transaction_details)?;
    rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
}
