//! Locally persisted session state.
//!
//! The session record is the only shared mutable state in the client. It is
//! written in full on login, mutated piecemeal by individual operations
//! (last write wins per field set) and destroyed on logout or token expiry.

pub mod store;

pub use store::SessionStore;

use serde::{Deserialize, Serialize};

/// A single wallet/balance entry from the server snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub currency: String,
    pub balance: String,
    #[serde(default)]
    pub account_number: Option<String>,
}

/// A transaction entry from the server snapshot. Passive payload, not used
/// in control flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub reference: String,
    pub kind: String,
    pub amount: String,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub narration: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// The persisted session record. Present on disk if and only if the user is
/// logged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionRecord {
    /// Opaque bearer credential.
    pub token: String,
    /// Absolute expiration, RFC 3339 or epoch seconds as a string.
    pub token_expiration: String,
    pub user_id: String,
    /// 4-digit step-up secret. Absent means step-up verification always
    /// fails until the user sets one.
    #[serde(default)]
    pub pin: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub reg_complete: Option<String>,
    #[serde(default)]
    pub photo_verification: Option<String>,
    #[serde(default)]
    pub wallets: Vec<Wallet>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Cached credentials enabling biometric re-login. Stored device-local,
/// outside the session record so logout of the session does not disable
/// biometric login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiometricCredentials {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub auth_token: Option<String>,
}
