//! Action initiators: every user-facing operation, each following the same
//! validate -> gate -> call -> outcome sequence.

pub mod account;
pub mod bills;
pub mod cards;
pub mod deposit;
pub mod forms;
pub mod profile;
pub mod tickets;
pub mod token_transfer;
pub mod transfer;

use crate::api::{ApiClient, ApiError, OperationResponse};
use crate::auth::guard::{run_protected, ActionGuard, ProtectedError};
use crate::auth::step_up::{BiometricProvider, PinSource, StepUpError};
use crate::auth::{AuthError, ValidatedCredentials};
use crate::ops::forms::FormError;
use crate::session::SessionStore;
use std::future::Future;
use thiserror::Error;

/// Failure of a user-facing operation, flattened so callers can match on a
/// single taxonomy.
#[derive(Debug, Error)]
pub enum OpError {
    /// Local, pre-network; rendered inline next to the offending field.
    #[error("{0}")]
    Form(#[from] FormError),
    /// Fatal to the action; forces re-authentication.
    #[error("{0}")]
    Auth(#[from] AuthError),
    /// Recoverable; the user re-initiates the action.
    #[error("verification failed: {0}")]
    StepUp(StepUpError),
    #[error("{0}")]
    Api(#[from] ApiError),
    /// Local storage and other device-level failures.
    #[error("{0}")]
    Device(anyhow::Error),
}

impl From<anyhow::Error> for OpError {
    fn from(err: anyhow::Error) -> Self {
        Self::Device(err)
    }
}

impl From<ProtectedError> for OpError {
    fn from(err: ProtectedError) -> Self {
        match err {
            ProtectedError::Auth(inner) => Self::Auth(inner),
            ProtectedError::StepUp(inner) => Self::StepUp(inner),
            ProtectedError::Api(inner) => Self::Api(inner),
        }
    }
}

/// Shared dependencies for the action initiators, passed explicitly; no
/// ambient globals.
pub struct Gateway<'a, P, B> {
    pub store: &'a SessionStore,
    pub client: &'a ApiClient,
    pub guard: &'a ActionGuard,
    pub pin_source: &'a P,
    pub biometric: &'a B,
}

impl<P, B> Gateway<'_, P, B>
where
    P: PinSource,
    B: BiometricProvider,
{
    /// Run `op` as a protected action (token validation + step-up first).
    ///
    /// # Errors
    /// Propagates auth, step-up and API failures.
    pub async fn protected<F, Fut>(&self, op: F) -> Result<OperationResponse, OpError>
    where
        F: FnOnce(ValidatedCredentials) -> Fut,
        Fut: Future<Output = Result<OperationResponse, ApiError>>,
    {
        run_protected(
            self.guard,
            self.store,
            self.client,
            self.pin_source,
            self.biometric,
            op,
        )
        .await
        .map_err(OpError::from)
    }
}
