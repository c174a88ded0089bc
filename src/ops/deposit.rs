//! Deposits through third-party payment processors. The server responds
//! with a checkout hand-off and the deposit stays `pending` until webhook
//! settlement; the client never talks to the processor SDK directly.

use crate::api::{DepositInit, Outcome};
use crate::auth::step_up::{BiometricProvider, PinSource};
use crate::ops::transfer::with_user;
use crate::ops::{forms, Gateway, OpError};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DepositForm {
    pub amount: String,
    pub currency: String,
    /// Processor slug as exposed by the server, e.g. "flutterwave" or
    /// "squad".
    pub provider: String,
}

/// What the caller renders: the terminal outcome plus the checkout
/// hand-off when the processor issued one.
#[derive(Debug)]
pub struct DepositReceipt {
    pub outcome: Outcome,
    pub init: Option<DepositInit>,
}

/// Initiate a deposit.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn create<P, B>(
    gw: &Gateway<'_, P, B>,
    form: &DepositForm,
) -> Result<DepositReceipt, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::amount(&form.amount)?;
    forms::required("currency", &form.currency)?;
    forms::required("provider", &form.provider)?;

    let client = gw.client;
    let payload = json!({
        "amount": form.amount,
        "currency": form.currency,
        "provider": form.provider,
        "reference": Uuid::new_v4().to_string(),
    });
    let response = gw
        .protected(|creds| async move {
            let payload = with_user(payload, &creds.user_id);
            client.post_operation("/deposits", &creds, &payload).await
        })
        .await?;

    let init = serde_json::from_value(response.data.clone()).ok();
    Ok(DepositReceipt {
        outcome: response.outcome,
        init,
    })
}
