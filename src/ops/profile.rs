//! Profile and security management: PIN, password and phone changes. All
//! step-up gated; the current PIN (or biometric) confirms intent before any
//! credential changes hands.

use crate::api::{Outcome, OperationResponse};
use crate::auth::step_up::{BiometricProvider, PinSource};
use crate::ops::transfer::with_user;
use crate::ops::{forms, Gateway, OpError};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, instrument};

/// Change the step-up PIN. On a successful server response the new PIN is
/// written back into the session record so subsequent verifications use it.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn change_pin<P, B>(gw: &Gateway<'_, P, B>, new_pin: &str) -> Result<Outcome, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::pin(new_pin)?;
    let new_pin = new_pin.trim().to_string();

    let client = gw.client;
    let payload = json!({ "new_pin": new_pin });
    let response: OperationResponse = gw
        .protected(|creds| async move {
            let payload = with_user(payload, &creds.user_id);
            client.post_operation("/profile/pin", &creds, &payload).await
        })
        .await?;

    if response.outcome.is_success() {
        if let Err(err) = gw.store.merge(|record| record.pin = Some(new_pin.clone())) {
            debug!("pin not persisted locally, next login will refresh it: {err}");
        }
    }
    Ok(response.outcome)
}

/// Change the account password.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn change_password<P, B>(
    gw: &Gateway<'_, P, B>,
    current: &SecretString,
    new: &SecretString,
) -> Result<Outcome, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    if current.expose_secret().is_empty() {
        return Err(forms::required("current password", "").unwrap_err().into());
    }
    if new.expose_secret().is_empty() {
        return Err(forms::required("new password", "").unwrap_err().into());
    }

    let client = gw.client;
    let payload = json!({
        "current_password": current.expose_secret(),
        "new_password": new.expose_secret(),
    });
    let response = gw
        .protected(|creds| async move {
            let payload = with_user(payload, &creds.user_id);
            client
                .post_operation("/profile/password", &creds, &payload)
                .await
        })
        .await?;
    Ok(response.outcome)
}

/// Change the registered phone number.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn change_phone<P, B>(gw: &Gateway<'_, P, B>, new_phone: &str) -> Result<Outcome, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::phone(new_phone)?;
    let new_phone = new_phone.trim().to_string();

    let client = gw.client;
    let payload = json!({ "new_phone": new_phone });
    let response = gw
        .protected(|creds| async move {
            let payload = with_user(payload, &creds.user_id);
            client
                .post_operation("/profile/phone", &creds, &payload)
                .await
        })
        .await?;

    if response.outcome.is_success() {
        if let Err(err) = gw.store.merge(|record| record.phone = Some(new_phone.clone())) {
            debug!("phone not persisted locally, next login will refresh it: {err}");
        }
    }
    Ok(response.outcome)
}
