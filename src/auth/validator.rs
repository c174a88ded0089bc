use crate::auth::{AuthError, ValidatedCredentials};
use crate::session::SessionStore;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::{debug, error, instrument};

/// The single choke point every authenticated operation passes through
/// before using network credentials.
///
/// Validation is a read with one deliberate side effect: detecting an
/// expired token wipes the session store so the client cannot keep
/// presenting stale credentials. Callers must treat `TokenExpired` as a
/// forced re-authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenValidator;

impl TokenValidator {
    /// Validate the stored session against the device wall clock.
    ///
    /// # Errors
    /// Returns `SessionMissing`, `TokenMissing` or `TokenExpired` per the
    /// session state; `TokenExpired` clears the store first.
    #[instrument(skip(store))]
    pub fn validate(store: &SessionStore) -> Result<ValidatedCredentials, AuthError> {
        Self::validate_at(store, Utc::now())
    }

    /// Validation with an explicit clock, used by `validate` and by tests
    /// that pin the boundary.
    pub fn validate_at(
        store: &SessionStore,
        now: DateTime<Utc>,
    ) -> Result<ValidatedCredentials, AuthError> {
        let record = store
            .load()
            .map_err(|err| {
                error!("failed to read session store: {err}");
                AuthError::SessionMissing
            })?
            .ok_or(AuthError::SessionMissing)?;

        if record.token.trim().is_empty() {
            return Err(AuthError::TokenMissing);
        }

        // Unparseable expirations are treated as already expired: a session
        // whose lifetime cannot be established must not be trusted.
        let expires = parse_expiration(&record.token_expiration);
        let expired = match expires {
            Some(expiration) => now >= expiration,
            None => true,
        };

        if expired {
            debug!("token expired at {:?}", record.token_expiration);
            if let Err(err) = store.clear() {
                error!("failed to clear expired session: {err}");
            }
            return Err(AuthError::TokenExpired);
        }

        Ok(ValidatedCredentials {
            token: record.token,
            user_id: record.user_id,
            token_expiration: record.token_expiration,
        })
    }
}

/// Parse an expiration string: RFC 3339, a naive `YYYY-MM-DD HH:MM:SS`, or
/// epoch seconds.
fn parse_expiration(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}
