//! Database layer
//!
//! Handles SQLite database operations including:
//! - Schema creation and version-gated migrations
//! - Wallet, preferences, payee and transaction detail queries

pub mod models;
pub mod schema;
pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::Database;
pub use migrations::CURRENT_VERSION;
pub use models::*;
