//! Money transfer initiators: wallet-to-wallet send, bank payout and FX
//! payout. All step-up gated.

use crate::api::OperationResponse;
use crate::auth::step_up::{BiometricProvider, PinSource};
use crate::ops::{forms, Gateway, OpError};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SendMoneyForm {
    pub amount: String,
    pub currency: String,
    pub recipient_account: String,
    pub narration: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PayoutForm {
    pub amount: String,
    pub currency: String,
    pub bank_code: String,
    pub account_number: String,
    pub account_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FxPayoutForm {
    pub amount: String,
    pub source_currency: String,
    pub target_currency: String,
    /// Rate the user was quoted; echoed to the server so it can refuse a
    /// stale quote.
    pub quoted_rate: String,
    pub bank_code: String,
    pub account_number: String,
}

/// Send money to another wallet.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn send_money<P, B>(
    gw: &Gateway<'_, P, B>,
    form: &SendMoneyForm,
) -> Result<OperationResponse, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::amount(&form.amount)?;
    forms::required("currency", &form.currency)?;
    forms::required("recipient account", &form.recipient_account)?;

    let client = gw.client;
    let payload = json!({
        "amount": form.amount,
        "currency": form.currency,
        "recipient_account": form.recipient_account,
        "narration": form.narration,
        "reference": Uuid::new_v4().to_string(),
    });
    gw.protected(|creds| async move {
        let payload = with_user(payload, &creds.user_id);
        client.post_operation("/transfers", &creds, &payload).await
    })
    .await
}

/// Pay out to a bank account.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn payout<P, B>(
    gw: &Gateway<'_, P, B>,
    form: &PayoutForm,
) -> Result<OperationResponse, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::amount(&form.amount)?;
    forms::required("currency", &form.currency)?;
    forms::required("bank", &form.bank_code)?;
    forms::required("account number", &form.account_number)?;

    let client = gw.client;
    let payload = json!({
        "amount": form.amount,
        "currency": form.currency,
        "bank_code": form.bank_code,
        "account_number": form.account_number,
        "account_name": form.account_name,
        "reference": Uuid::new_v4().to_string(),
    });
    gw.protected(|creds| async move {
        let payload = with_user(payload, &creds.user_id);
        client.post_operation("/payouts", &creds, &payload).await
    })
    .await
}

/// Pay out with currency conversion at a quoted rate.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn fx_payout<P, B>(
    gw: &Gateway<'_, P, B>,
    form: &FxPayoutForm,
) -> Result<OperationResponse, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::amount(&form.amount)?;
    forms::required("source currency", &form.source_currency)?;
    forms::required("target currency", &form.target_currency)?;
    forms::required("quoted rate", &form.quoted_rate)?;
    forms::required("bank", &form.bank_code)?;
    forms::required("account number", &form.account_number)?;

    let client = gw.client;
    let payload = json!({
        "amount": form.amount,
        "source_currency": form.source_currency,
        "target_currency": form.target_currency,
        "quoted_rate": form.quoted_rate,
        "bank_code": form.bank_code,
        "account_number": form.account_number,
        "reference": Uuid::new_v4().to_string(),
    });
    gw.protected(|creds| async move {
        let payload = with_user(payload, &creds.user_id);
        client.post_operation("/payouts/fx", &creds, &payload).await
    })
    .await
}

/// The server expects the user id explicitly in the body, not derived from
/// the token.
pub(crate) fn with_user(mut payload: serde_json::Value, user_id: &str) -> serde_json::Value {
    if let Some(map) = payload.as_object_mut() {
        map.insert("user_id".to_string(), json!(user_id));
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::auth::guard::ActionGuard;
    use crate::auth::step_up::{NoBiometrics, StaticPin};
    use crate::ops::forms::FormError;
    use crate::session::SessionStore;
    use std::time::Duration;

    #[tokio::test]
    async fn invalid_amount_is_rejected_before_any_gate() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let guard = ActionGuard::new();
        let pin = StaticPin("1234".to_string());
        let gw = Gateway {
            store: &store,
            client: &client,
            guard: &guard,
            pin_source: &pin,
            biometric: &NoBiometrics,
        };
        let form = SendMoneyForm {
            amount: "-5".to_string(),
            currency: "KES".to_string(),
            recipient_account: "0011".to_string(),
            narration: None,
        };
        // No session exists either; the form error must win because it is
        // checked first.
        match send_money(&gw, &form).await {
            Err(OpError::Form(FormError::InvalidAmount)) => {}
            other => panic!("expected form rejection, got {other:?}"),
        }
    }

    #[test]
    fn with_user_injects_user_id() {
        let payload = with_user(json!({"amount": "5"}), "42");
        assert_eq!(payload["user_id"], "42");
        assert_eq!(payload["amount"], "5");
    }
}
