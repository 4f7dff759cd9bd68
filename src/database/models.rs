//! Data models for stored entities

use serde::{Deserialize, Serialize};

/// Default display currency
pub const DEFAULT_CURRENCY: &str = "usd";

/// Default UI theme
pub const DEFAULT_THEME: &str = "darkMode";

/// User preferences, stored in the singleton `preferences` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Fiat currency ticker used for display
    pub currency: String,
    pub notifications_enabled: bool,
    pub scan_coinbase_transactions: bool,
    pub limit_data: bool,
    /// UI theme name
    pub theme: String,
    /// Require PIN/biometric confirmation before sending (column `pinconfirmation`)
    pub auth_confirmation: bool,
    pub auto_optimize: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            notifications_enabled: true,
            scan_coinbase_transactions: false,
            limit_data: false,
            theme: DEFAULT_THEME.to_string(),
            auth_confirmation: false,
            auto_optimize: true,
        }
    }
}

/// Address book entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payee {
    /// Display name; not unique
    pub nickname: String,
    pub address: String,
    /// Optional payment ID attached to transfers to this payee
    #[serde(rename = "paymentID", default)]
    pub payment_id: Option<String>,
}

impl Payee {
    /// Create a payee without a payment ID
    pub fn new(nickname: &str, address: &str) -> Self {
        Self {
            nickname: nickname.to_string(),
            address: address.to_string(),
            payment_id: None,
        }
    }

    /// Attach a payment ID
    pub fn with_payment_id(mut self, payment_id: &str) -> Self {
        self.payment_id = Some(payment_id.to_string());
        self
    }
}

/// Cached annotation for a transaction
///
/// Rows are append-only and keyed only logically by `hash`; the same hash may
/// appear more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub hash: String,
    pub memo: String,
    pub address: String,
    pub payee: String,
}
