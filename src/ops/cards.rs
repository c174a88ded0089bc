//! Virtual card management. Listing is a plain authenticated read; create,
//! fund and freeze move money or change spending power and are step-up
//! gated.

use crate::api::{Card, OperationResponse};
use crate::auth::step_up::{BiometricProvider, PinSource};
use crate::auth::validator::TokenValidator;
use crate::ops::transfer::with_user;
use crate::ops::{forms, Gateway, OpError};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

/// List the user's virtual cards.
///
/// # Errors
/// Returns auth or API failures.
pub async fn list<P, B>(gw: &Gateway<'_, P, B>) -> Result<Vec<Card>, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    let creds = TokenValidator::validate(gw.store)?;
    Ok(gw.client.cards(&creds).await?)
}

/// Create a new virtual card in `currency`.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn create<P, B>(
    gw: &Gateway<'_, P, B>,
    currency: &str,
) -> Result<OperationResponse, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::required("currency", currency)?;

    let client = gw.client;
    let payload = json!({
        "currency": currency,
        "reference": Uuid::new_v4().to_string(),
    });
    gw.protected(|creds| async move {
        let payload = with_user(payload, &creds.user_id);
        client.post_operation("/cards", &creds, &payload).await
    })
    .await
}

/// Fund a card from the wallet.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn fund<P, B>(
    gw: &Gateway<'_, P, B>,
    card_id: &str,
    amount: &str,
) -> Result<OperationResponse, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::required("card", card_id)?;
    forms::amount(amount)?;

    let client = gw.client;
    let path = format!("/cards/{card_id}/fund");
    let payload = json!({
        "amount": amount,
        "reference": Uuid::new_v4().to_string(),
    });
    gw.protected(|creds| async move {
        let payload = with_user(payload, &creds.user_id);
        client.post_operation(&path, &creds, &payload).await
    })
    .await
}

/// Freeze (or unfreeze) a card.
///
/// # Errors
/// Form failures before any network call; then auth, step-up or API
/// failures.
#[instrument(skip_all)]
pub async fn freeze<P, B>(
    gw: &Gateway<'_, P, B>,
    card_id: &str,
    frozen: bool,
) -> Result<OperationResponse, OpError>
where
    P: PinSource,
    B: BiometricProvider,
{
    forms::required("card", card_id)?;

    let client = gw.client;
    let path = format!("/cards/{card_id}/freeze");
    let payload = json!({ "frozen": frozen });
    gw.protected(|creds| async move {
        let payload = with_user(payload, &creds.user_id);
        client.post_operation(&path, &creds, &payload).await
    })
    .await
}
