//! Step-up verification: re-confirm user intent immediately before an
//! irreversible financial action, independent of the long-lived token.
//!
//! The verifier is an awaitable request: callers invoke [`StepUpVerifier::verify`]
//! and receive exactly one [`StepUpOutcome`] per attempt. There is no retry
//! loop and no lockout; a failed attempt returns control to the caller, who
//! must re-initiate the whole action.

use crate::session::SessionStore;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Reasons a verification attempt can fail. All recoverable: the user may
/// start the action again from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepUpError {
    #[error("incorrect PIN")]
    PinMismatch,
    #[error("PIN must be exactly 4 digits")]
    InvalidPin,
    #[error("no PIN is set for this account")]
    NoPinSet,
    #[error("biometric authentication failed")]
    BiometricFailed,
    #[error("verification was cancelled")]
    InputAborted,
    #[error("could not read the session")]
    StoreUnavailable,
}

/// Observable verifier lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepUpState {
    Idle,
    AwaitingInput,
    Verifying,
    Success,
    Failed,
}

/// The single result of one verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepUpOutcome {
    Verified,
    Failed { reason: StepUpError },
}

impl StepUpOutcome {
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Source of candidate PINs (a prompt on the CLI, a keypad on a device).
#[allow(async_fn_in_trait)]
pub trait PinSource {
    /// Resolve once the user has entered a candidate PIN. Resolving with an
    /// error means input was cancelled or unavailable.
    async fn read_pin(&self) -> anyhow::Result<String>;
}

/// Platform biometric hardware, kept behind a seam so the core never touches
/// platform APIs directly.
#[allow(async_fn_in_trait)]
pub trait BiometricProvider {
    /// Whether hardware is present and a biometric is enrolled.
    fn is_available(&self) -> bool;
    /// Resolve when capture completes; `Ok(true)` on a successful match.
    async fn authenticate(&self) -> anyhow::Result<bool>;
}

/// A fixed PIN source, for tests and scripted flows.
#[derive(Debug, Clone)]
pub struct StaticPin(pub String);

impl PinSource for StaticPin {
    async fn read_pin(&self) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

/// A PIN source that never resolves; the biometric path must win.
#[derive(Debug, Clone, Copy)]
pub struct NoPinEntry;

impl PinSource for NoPinEntry {
    async fn read_pin(&self) -> anyhow::Result<String> {
        std::future::pending().await
    }
}

/// Absent biometric hardware.
#[derive(Debug, Clone, Copy)]
pub struct NoBiometrics;

impl BiometricProvider for NoBiometrics {
    fn is_available(&self) -> bool {
        false
    }

    async fn authenticate(&self) -> anyhow::Result<bool> {
        Ok(false)
    }
}

enum Input {
    Pin(anyhow::Result<String>),
    Biometric(anyhow::Result<bool>),
}

/// One verification attempt: `Idle -> AwaitingInput -> Verifying ->
/// {Success, Failed}`.
///
/// When biometrics are available, the PIN and biometric paths run
/// concurrently and the first to resolve wins; the losing future is dropped.
#[derive(Debug)]
pub struct StepUpVerifier {
    state: StepUpState,
}

impl Default for StepUpVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StepUpVerifier {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: StepUpState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> StepUpState {
        self.state
    }

    /// Run one verification attempt. Produces exactly one outcome; never
    /// panics, never retries.
    #[instrument(skip_all)]
    pub async fn verify<P, B>(
        &mut self,
        store: &SessionStore,
        pin_source: &P,
        biometric: &B,
    ) -> StepUpOutcome
    where
        P: PinSource,
        B: BiometricProvider,
    {
        self.state = StepUpState::AwaitingInput;
        let input = if biometric.is_available() {
            tokio::select! {
                entered = pin_source.read_pin() => Input::Pin(entered),
                matched = biometric.authenticate() => Input::Biometric(matched),
            }
        } else {
            Input::Pin(pin_source.read_pin().await)
        };

        self.state = StepUpState::Verifying;
        let outcome = match input {
            Input::Biometric(Ok(true)) => {
                debug!("biometric verification succeeded");
                StepUpOutcome::Verified
            }
            Input::Biometric(Ok(false)) => fail(StepUpError::BiometricFailed),
            Input::Biometric(Err(err)) => {
                warn!("biometric capture error: {err}");
                fail(StepUpError::BiometricFailed)
            }
            Input::Pin(Err(err)) => {
                warn!("pin entry aborted: {err}");
                fail(StepUpError::InputAborted)
            }
            Input::Pin(Ok(entered)) => check_pin(store, entered.trim()),
        };

        self.state = if outcome.is_verified() {
            StepUpState::Success
        } else {
            StepUpState::Failed
        };
        outcome
    }
}

fn fail(reason: StepUpError) -> StepUpOutcome {
    StepUpOutcome::Failed { reason }
}

/// Exact string comparison against the stored PIN, after trimming. No
/// hashing and no lockout, by contract with the server-issued record.
fn check_pin(store: &SessionStore, entered: &str) -> StepUpOutcome {
    if entered.len() != 4 || !entered.chars().all(|c| c.is_ascii_digit()) {
        return fail(StepUpError::InvalidPin);
    }
    let record = match store.load() {
        Ok(Some(record)) => record,
        Ok(None) => return fail(StepUpError::NoPinSet),
        Err(err) => {
            warn!("failed to read session during verification: {err}");
            return fail(StepUpError::StoreUnavailable);
        }
    };
    match record.pin.as_deref() {
        None => fail(StepUpError::NoPinSet),
        Some(stored) if stored == entered => {
            store.write_saved_pin(entered);
            StepUpOutcome::Verified
        }
        Some(_) => fail(StepUpError::PinMismatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRecord;

    struct GrantedBiometric;

    impl BiometricProvider for GrantedBiometric {
        fn is_available(&self) -> bool {
            true
        }

        async fn authenticate(&self) -> anyhow::Result<bool> {
            Ok(true)
        }
    }

    struct DeniedBiometric;

    impl BiometricProvider for DeniedBiometric {
        fn is_available(&self) -> bool {
            true
        }

        async fn authenticate(&self) -> anyhow::Result<bool> {
            Ok(false)
        }
    }

    fn store_with_pin(pin: Option<&str>) -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        store
            .save(&SessionRecord {
                token: "T1".to_string(),
                token_expiration: "2030-01-01T00:00:00Z".to_string(),
                user_id: "42".to_string(),
                pin: pin.map(str::to_string),
                ..SessionRecord::default()
            })
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn correct_pin_verifies() {
        let (_dir, store) = store_with_pin(Some("1234"));
        let mut verifier = StepUpVerifier::new();
        let outcome = verifier
            .verify(&store, &StaticPin("1234".to_string()), &NoBiometrics)
            .await;
        assert_eq!(outcome, StepUpOutcome::Verified);
        assert_eq!(verifier.state(), StepUpState::Success);
    }

    #[tokio::test]
    async fn pin_is_trimmed_before_comparison() {
        let (_dir, store) = store_with_pin(Some("1234"));
        let outcome = StepUpVerifier::new()
            .verify(&store, &StaticPin(" 1234\n".to_string()), &NoBiometrics)
            .await;
        assert_eq!(outcome, StepUpOutcome::Verified);
    }

    #[tokio::test]
    async fn wrong_pin_fails() {
        let (_dir, store) = store_with_pin(Some("1234"));
        let mut verifier = StepUpVerifier::new();
        let outcome = verifier
            .verify(&store, &StaticPin("9999".to_string()), &NoBiometrics)
            .await;
        assert_eq!(
            outcome,
            StepUpOutcome::Failed {
                reason: StepUpError::PinMismatch
            }
        );
        assert_eq!(verifier.state(), StepUpState::Failed);
    }

    #[tokio::test]
    async fn short_pin_never_succeeds() {
        let (_dir, store) = store_with_pin(Some("1234"));
        let outcome = StepUpVerifier::new()
            .verify(&store, &StaticPin("123".to_string()), &NoBiometrics)
            .await;
        assert_eq!(
            outcome,
            StepUpOutcome::Failed {
                reason: StepUpError::InvalidPin
            }
        );
    }

    #[tokio::test]
    async fn non_numeric_pin_never_succeeds() {
        let (_dir, store) = store_with_pin(Some("1234"));
        let outcome = StepUpVerifier::new()
            .verify(&store, &StaticPin("12a4".to_string()), &NoBiometrics)
            .await;
        assert_eq!(
            outcome,
            StepUpOutcome::Failed {
                reason: StepUpError::InvalidPin
            }
        );
    }

    #[tokio::test]
    async fn absent_pin_always_fails() {
        let (_dir, store) = store_with_pin(None);
        let outcome = StepUpVerifier::new()
            .verify(&store, &StaticPin("1234".to_string()), &NoBiometrics)
            .await;
        assert_eq!(
            outcome,
            StepUpOutcome::Failed {
                reason: StepUpError::NoPinSet
            }
        );
    }

    #[tokio::test]
    async fn biometric_success_wins_over_pending_pin_entry() {
        let (_dir, store) = store_with_pin(Some("1234"));
        let mut verifier = StepUpVerifier::new();
        let outcome = verifier.verify(&store, &NoPinEntry, &GrantedBiometric).await;
        assert_eq!(outcome, StepUpOutcome::Verified);
        assert_eq!(verifier.state(), StepUpState::Success);
    }

    #[tokio::test]
    async fn biometric_denial_fails_the_attempt() {
        let (_dir, store) = store_with_pin(Some("1234"));
        let outcome = StepUpVerifier::new()
            .verify(&store, &NoPinEntry, &DeniedBiometric)
            .await;
        assert_eq!(
            outcome,
            StepUpOutcome::Failed {
                reason: StepUpError::BiometricFailed
            }
        );
    }

    #[tokio::test]
    async fn state_machine_starts_idle() {
        let verifier = StepUpVerifier::new();
        assert_eq!(verifier.state(), StepUpState::Idle);
    }
}
