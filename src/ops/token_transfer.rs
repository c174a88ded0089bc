//! Token (MTCN) transfers: send money collectable with a control number,
//! and redeem a control number into the wallet.

use crate::api::{Outcome, TokenTransferInit};
use crate::auth::step_up::{BiometricProvider, PinSource};
use crate::ops::transfer::with_user;
use crate::ops::{forms, Gateway, OpError};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TokenTransferForm {
    pub amount: String,
    pub currency: String,
    pub recipient_name: String,
    pub recipient_phone: String,
}

/// Terminal outcome plus the issued control number on success.
#[derive(Debug)]
pub struct TokenTransferReceipt {
    pub outcome: Outcome,
    pub init: Option<TokenTransferInit>,
}

/// Create a token transfer; the server issues the control number the
/// recipient presents at collection.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn create<P, B>(
    gw: &Gateway<'_, P, B>,
    form: &TokenTransferForm,
) -> Result<TokenTransferReceipt, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::amount(&form.amount)?;
    forms::required("currency", &form.currency)?;
    forms::required("recipient name", &form.recipient_name)?;
    forms::phone(&form.recipient_phone)?;

    let client = gw.client;
    let payload = json!({
        "amount": form.amount,
        "currency": form.currency,
        "recipient_name": form.recipient_name,
        "recipient_phone": form.recipient_phone,
        "reference": Uuid::new_v4().to_string(),
    });
    let response = gw
        .protected(|creds| async move {
            let payload = with_user(payload, &creds.user_id);
            client
                .post_operation("/token-transfers", &creds, &payload)
                .await
        })
        .await?;

    let init = serde_json::from_value(response.data.clone()).ok();
    Ok(TokenTransferReceipt {
        outcome: response.outcome,
        init,
    })
}

/// Redeem a control number into the caller's wallet.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn redeem<P, B>(
    gw: &Gateway<'_, P, B>,
    control_number: &str,
) -> Result<Outcome, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::required("control number", control_number)?;

    let client = gw.client;
    let payload = json!({ "control_number": control_number.trim() });
    let response = gw
        .protected(|creds| async move {
            let payload = with_user(payload, &creds.user_id);
            client
                .post_operation("/token-transfers/redeem", &creds, &payload)
                .await
        })
        .await?;
    Ok(response.outcome)
}
