//! Authentication gating: token validation and step-up verification.
//!
//! Every sensitive operation passes through the same choke points before any
//! network credential is used: [`validator::TokenValidator`] checks session
//! liveness, [`step_up::StepUpVerifier`] re-confirms user intent, and
//! [`guard::run_protected`] composes them with the remote call.

pub mod guard;
pub mod step_up;
pub mod validator;

use thiserror::Error;

/// Fatal session-level failures. All of these abort the current action and
/// force re-authentication; `TokenExpired` additionally wipes the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no session: please log in")]
    SessionMissing,
    #[error("session has no token: please log in again")]
    TokenMissing,
    #[error("session expired: please log in again")]
    TokenExpired,
    #[error("another protected action is already in progress")]
    ActionInFlight,
}

/// Credentials returned by a successful validation, ready to be attached to
/// an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCredentials {
    pub token: String,
    pub user_id: String,
    pub token_expiration: String,
}
