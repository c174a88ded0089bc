//! Bill payment and airtime purchase. Both step-up gated.

use crate::api::OperationResponse;
use crate::auth::step_up::{BiometricProvider, PinSource};
use crate::ops::transfer::with_user;
use crate::ops::{forms, Gateway, OpError};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct BillPayForm {
    pub biller_code: String,
    /// Account/meter/smartcard number the biller resolves.
    pub customer_reference: String,
    pub amount: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct AirtimeForm {
    pub phone: String,
    pub amount: String,
    pub currency: String,
}

/// Pay a bill.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn pay_bill<P, B>(
    gw: &Gateway<'_, P, B>,
    form: &BillPayForm,
) -> Result<OperationResponse, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::required("biller", &form.biller_code)?;
    forms::required("customer reference", &form.customer_reference)?;
    forms::amount(&form.amount)?;
    forms::required("currency", &form.currency)?;

    let client = gw.client;
    let payload = json!({
        "biller_code": form.biller_code,
        "customer_reference": form.customer_reference,
        "amount": form.amount,
        "currency": form.currency,
        "reference": Uuid::new_v4().to_string(),
    });
    gw.protected(|creds| async move {
        let payload = with_user(payload, &creds.user_id);
        client.post_operation("/bills/pay", &creds, &payload).await
    })
    .await
}

/// Buy airtime for a phone number.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn buy_airtime<P, B>(
    gw: &Gateway<'_, P, B>,
    form: &AirtimeForm,
) -> Result<OperationResponse, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::phone(&form.phone)?;
    forms::amount(&form.amount)?;
    forms::required("currency", &form.currency)?;

    let client = gw.client;
    let payload = json!({
        "phone": form.phone,
        "amount": form.amount,
        "currency": form.currency,
        "reference": Uuid::new_v4().to_string(),
    });
    gw.protected(|creds| async move {
        let payload = with_user(payload, &creds.user_id);
        client.post_operation("/airtime", &creds, &payload).await
    })
    .await
}
