//! The generic protected-action runner.
//!
//! Every money-moving operation composes the same sequence: token
//! validation, step-up verification, the remote call, and a best-effort
//! refresh of the cached transaction snapshot. A single in-flight slot keyed
//! by a correlation id prevents a second protected action from starting
//! while one is pending.

use crate::api::{ApiClient, ApiError, OperationResponse};
use crate::auth::step_up::{BiometricProvider, PinSource, StepUpError, StepUpOutcome, StepUpVerifier};
use crate::auth::validator::TokenValidator;
use crate::auth::{AuthError, ValidatedCredentials};
use crate::session::SessionStore;
use std::future::Future;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use ulid::Ulid;

/// Failure of a protected action before or during the remote call.
#[derive(Debug, Error)]
pub enum ProtectedError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("verification failed: {0}")]
    StepUp(StepUpError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Single in-flight slot for protected actions. One guard instance is shared
/// per client; a second `begin` while a permit is alive fails with
/// `ActionInFlight`.
#[derive(Debug, Default)]
pub struct ActionGuard {
    slot: Mutex<Option<Ulid>>,
}

impl ActionGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the in-flight slot.
    ///
    /// # Errors
    /// Returns `ActionInFlight` if another protected action holds the slot.
    pub fn begin(&self) -> Result<ActionPermit<'_>, AuthError> {
        let mut slot = self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(id) = *slot {
            warn!("protected action rejected, {id} still in flight");
            return Err(AuthError::ActionInFlight);
        }
        let correlation_id = Ulid::new();
        *slot = Some(correlation_id);
        Ok(ActionPermit {
            guard: self,
            correlation_id,
        })
    }

    fn release(&self, id: Ulid) {
        let mut slot = self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if *slot == Some(id) {
            *slot = None;
        }
    }
}

/// Holds the in-flight slot for the duration of one protected action.
#[derive(Debug)]
pub struct ActionPermit<'a> {
    guard: &'a ActionGuard,
    pub correlation_id: Ulid,
}

impl Drop for ActionPermit<'_> {
    fn drop(&mut self) {
        self.guard.release(self.correlation_id);
    }
}

/// Run one protected action end to end: validate the session, verify user
/// intent, perform the remote call, classify it, and refresh the cached
/// transaction snapshot on success.
///
/// The caller is expected to have validated its form input already; nothing
/// here reaches the network until both gates have passed.
///
/// # Errors
/// Returns `Auth` failures (blocking, force re-authentication), `StepUp`
/// failures (recoverable, the user re-initiates) or `Api` failures. Business
/// rejections with a 2xx envelope come back as `Outcome::Failed`, not an
/// error.
#[instrument(skip_all)]
pub async fn run_protected<P, B, F, Fut>(
    guard: &ActionGuard,
    store: &SessionStore,
    client: &ApiClient,
    pin_source: &P,
    biometric: &B,
    op: F,
) -> Result<OperationResponse, ProtectedError>
where
    P: PinSource,
    B: BiometricProvider,
    F: FnOnce(ValidatedCredentials) -> Fut,
    Fut: Future<Output = Result<OperationResponse, ApiError>>,
{
    let permit = guard.begin()?;
    let creds = TokenValidator::validate(store)?;

    let mut verifier = StepUpVerifier::new();
    match verifier.verify(store, pin_source, biometric).await {
        StepUpOutcome::Verified => {}
        StepUpOutcome::Failed { reason } => return Err(ProtectedError::StepUp(reason)),
    }

    let refresh_creds = creds.clone();
    let response = op(creds).await?;

    if response.outcome.is_success() {
        refresh_transactions(store, client, &refresh_creds).await;
    }
    debug!(
        correlation_id = %permit.correlation_id,
        "protected action finished: {:?}", response.outcome
    );
    Ok(response)
}

/// Best-effort refresh of the cached transaction list after a successful
/// money-moving action. Failures are logged, never surfaced.
async fn refresh_transactions(
    store: &SessionStore,
    client: &ApiClient,
    creds: &ValidatedCredentials,
) {
    match client.transactions(creds).await {
        Ok(transactions) => {
            if let Err(err) = store.merge(|record| record.transactions = transactions) {
                debug!("could not persist refreshed transactions: {err}");
            }
        }
        Err(err) => debug!("transaction refresh skipped: {err}"),
    }
}
