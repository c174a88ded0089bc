//! Response types for the banking REST API.

use crate::session::{Transaction, Wallet};
use serde::{Deserialize, Serialize};

/// Session payload returned by `POST /login` and `POST /register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    pub token: String,
    pub token_expiration: String,
    pub user_id: String,
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
    /// One-time login OTP; acknowledged by the client, never persisted.
    #[serde(default)]
    pub otp: Option<String>,
}

/// A virtual card as listed by `GET /cards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub masked_pan: String,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub balance: Option<String>,
}

/// Checkout hand-off returned when a deposit is initiated through a
/// third-party processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositInit {
    pub provider: String,
    pub reference: String,
    #[serde(default)]
    pub checkout_url: Option<String>,
}

/// Control number issued for a token (MTCN) transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenTransferInit {
    pub control_number: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// A support ticket thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub subject: String,
    pub status: String,
    #[serde(default)]
    pub messages: Vec<TicketMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketMessage {
    pub sender: String,
    pub body: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use serde_json::json;

    #[test]
    fn login_response_parses_minimal_payload() -> Result<()> {
        let body = json!({
            "status": "success",
            "token": "T1",
            "token_expiration": "2030-01-01T00:00:00Z",
            "user_id": "42"
        });
        let parsed: LoginResponse = serde_json::from_value(body)?;
        assert_eq!(parsed.token, "T1");
        assert!(parsed.pin.is_none());
        assert!(parsed.wallets.is_empty());
        Ok(())
    }

    #[test]
    fn login_response_parses_full_payload() -> Result<()> {
        let body = json!({
            "status": "success",
            "token": "T1",
            "token_expiration": "2030-01-01T00:00:00Z",
            "user_id": "42",
            "pin": "1234",
            "reg_complete": "1",
            "photo_verification": "VERIFIED",
            "wallets": [{"currency": "KES", "balance": "100.00"}],
            "transactions": [],
            "otp": "000111"
        });
        let parsed: LoginResponse = serde_json::from_value(body)?;
        assert_eq!(parsed.pin.as_deref(), Some("1234"));
        assert_eq!(parsed.otp.as_deref(), Some("000111"));
        let wallet = parsed.wallets.first().context("missing wallet")?;
        assert_eq!(wallet.currency, "KES");
        Ok(())
    }

    #[test]
    fn deposit_init_parses_checkout_url() -> Result<()> {
        let body = json!({
            "provider": "flutterwave",
            "reference": "DEP-9",
            "checkout_url": "https://checkout.example/pay/DEP-9"
        });
        let parsed: DepositInit = serde_json::from_value(body)?;
        assert_eq!(parsed.provider, "flutterwave");
        assert!(parsed.checkout_url.is_some());
        Ok(())
    }
}
