//! Support tickets. Token-validated CRUD; not money-moving, so no step-up
//! gate.

use crate::api::{Outcome, Ticket};
use crate::auth::validator::TokenValidator;
use crate::ops::transfer::with_user;
use crate::ops::{forms, OpError};
use crate::api::ApiClient;
use crate::session::SessionStore;
use serde_json::json;
use tracing::instrument;

/// List the user's tickets.
///
/// # Errors
/// Returns auth or API failures.
pub async fn list(store: &SessionStore, client: &ApiClient) -> Result<Vec<Ticket>, OpError> {
    let creds = TokenValidator::validate(store)?;
    Ok(client.tickets(&creds).await?)
}

/// Open a new ticket.
///
/// # Errors
/// Form failures before any network call; then auth or API failures.
#[instrument(skip_all)]
pub async fn open(
    store: &SessionStore,
    client: &ApiClient,
    subject: &str,
    body: &str,
) -> Result<Outcome, OpError> {
    forms::required("subject", subject)?;
    forms::required("message", body)?;

    let creds = TokenValidator::validate(store)?;
    let payload = with_user(json!({ "subject": subject, "body": body }), &creds.user_id);
    let response = client.post_operation("/tickets", &creds, &payload).await?;
    Ok(response.outcome)
}

/// Reply on an existing ticket thread.
///
/// # Errors
/// Form failures before any network call; then auth or API failures.
#[instrument(skip_all)]
pub async fn reply(
    store: &SessionStore,
    client: &ApiClient,
    ticket_id: &str,
    body: &str,
) -> Result<Outcome, OpError> {
    forms::required("ticket", ticket_id)?;
    forms::required("message", body)?;

    let creds = TokenValidator::validate(store)?;
    let path = format!("/tickets/{ticket_id}/reply");
    let payload = with_user(json!({ "body": body }), &creds.user_id);
    let response = client.post_operation(&path, &creds, &payload).await?;
    Ok(response.outcome)
}
