//! # Tumapay (Mobile Money Client Core)
//!
//! `tumapay` is the headless core of a mobile money client. It manages the
//! locally persisted session, validates token liveness before every
//! authenticated call, and gates money-moving operations behind step-up
//! verification (PIN or biometrics).
//!
//! ## Session model
//!
//! A session record exists on disk if and only if the user is logged in.
//! The record carries the bearer token, its absolute expiration, the user
//! id, the step-up PIN and a wallet/transaction snapshot. Token expiry is
//! checked against the device wall clock with an inclusive boundary; an
//! expired session is wiped immediately and the caller must re-authenticate.
//!
//! ## Protected actions
//!
//! Every money-moving operation follows the same sequence: local form
//! validation, token validation, step-up verification, remote call, and
//! classification of the response into a `success`/`pending`/`failed`
//! outcome. Step-up verification is an awaitable request returning a typed
//! outcome; exactly one outcome is produced per attempt. A single in-flight
//! guard prevents a second protected action from starting while one is
//! pending.

pub mod api;
pub mod auth;
pub mod cli;
pub mod ops;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
    }
}
