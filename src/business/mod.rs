//! Application-facing layer
//!
//! Provides [`WalletStore`], the async lifecycle façade that composes the
//! database and the key-value store.

pub mod store;

pub use store::{WalletSerializer, WalletStore, report_caught_error};
