//! Account lifecycle: login, biometric re-login, registration, logout and
//! the wallet/transaction reads.

use crate::api::{ApiClient, LoginResponse};
use crate::auth::step_up::BiometricProvider;
use crate::auth::validator::TokenValidator;
use crate::ops::{forms, OpError};
use crate::session::{BiometricCredentials, SessionRecord, SessionStore, Transaction, Wallet};
use anyhow::anyhow;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument};

fn record_from(response: LoginResponse) -> SessionRecord {
    SessionRecord {
        token: response.token,
        token_expiration: response.token_expiration,
        user_id: response.user_id,
        pin: response.pin,
        first_name: response.first_name,
        last_name: response.last_name,
        email: response.email,
        phone: response.phone,
        reg_complete: response.reg_complete,
        photo_verification: response.photo_verification,
        wallets: response.wallets,
        transactions: response.transactions,
    }
}

/// Authenticate and persist the full session payload.
///
/// # Errors
/// Returns form, API or storage failures.
#[instrument(skip_all, fields(email))]
pub async fn login(
    store: &SessionStore,
    client: &ApiClient,
    email: &str,
    password: &SecretString,
    remember_for_biometrics: bool,
) -> Result<SessionRecord, OpError> {
    forms::email(email)?;
    if password.expose_secret().is_empty() {
        return Err(forms::required("password", "").unwrap_err().into());
    }

    let device_id = store.device_id()?;
    let response = client.login(email, password, &device_id).await?;
    if let Some(otp) = &response.otp {
        // One-time login OTP is acknowledged but never persisted.
        debug!("login OTP received ({} digits)", otp.len());
    }

    let record = record_from(response);
    store.save(&record)?;

    if remember_for_biometrics {
        store.save_biometric_credentials(&BiometricCredentials {
            email: email.to_string(),
            password: password.expose_secret().to_string(),
            auth_token: Some(record.token.clone()),
        })?;
    }

    info!("logged in as {}", record.user_id);
    Ok(record)
}

/// Re-login using cached credentials after a successful biometric match.
///
/// # Errors
/// Fails if biometric login is not set up, the biometric is denied, or the
/// login call fails.
#[instrument(skip_all)]
pub async fn biometric_login<B: BiometricProvider>(
    store: &SessionStore,
    client: &ApiClient,
    biometric: &B,
) -> Result<SessionRecord, OpError> {
    let creds = store
        .load_biometric_credentials()?
        .ok_or_else(|| anyhow!("biometric login is not set up on this device"))?;

    if !biometric.is_available() {
        return Err(anyhow!("no biometric hardware available").into());
    }
    let matched = biometric.authenticate().await.unwrap_or(false);
    if !matched {
        return Err(OpError::StepUp(
            crate::auth::step_up::StepUpError::BiometricFailed,
        ));
    }

    let password = SecretString::from(creds.password);
    login(store, client, &creds.email, &password, false).await
}

/// Register a new account; the server responds with a full session payload.
///
/// # Errors
/// Returns form, API or storage failures.
#[instrument(skip_all, fields(email))]
pub async fn register(
    store: &SessionStore,
    client: &ApiClient,
    email: &str,
    password: &SecretString,
    phone: &str,
    first_name: &str,
    last_name: &str,
) -> Result<SessionRecord, OpError> {
    forms::email(email)?;
    forms::phone(phone)?;
    forms::required("first name", first_name)?;
    forms::required("last name", last_name)?;
    if password.expose_secret().is_empty() {
        return Err(forms::required("password", "").unwrap_err().into());
    }

    let device_id = store.device_id()?;
    let response = client
        .register(email, password, phone, first_name, last_name, &device_id)
        .await?;
    let record = record_from(response);
    store.save(&record)?;
    info!("registered as {}", record.user_id);
    Ok(record)
}

/// Explicit logout: wipe the session store, optionally forgetting the
/// cached biometric credentials too.
///
/// # Errors
/// Returns storage failures; clearing an absent session is fine.
pub fn logout(store: &SessionStore, forget_biometrics: bool) -> Result<(), OpError> {
    store.clear()?;
    if forget_biometrics {
        store.clear_biometric_credentials()?;
    }
    info!("logged out");
    Ok(())
}

/// Fetch wallets and refresh the cached snapshot. Token-validated, not
/// step-up gated (a read, not a money-moving action).
///
/// # Errors
/// Returns auth or API failures.
pub async fn wallets(store: &SessionStore, client: &ApiClient) -> Result<Vec<Wallet>, OpError> {
    let creds = TokenValidator::validate(store)?;
    let wallets = client.wallets(&creds).await?;
    let snapshot = wallets.clone();
    if let Err(err) = store.merge(|record| record.wallets = snapshot) {
        debug!("wallet snapshot refresh skipped: {err}");
    }
    Ok(wallets)
}

/// Fetch transactions and refresh the cached snapshot.
///
/// # Errors
/// Returns auth or API failures.
pub async fn transactions(
    store: &SessionStore,
    client: &ApiClient,
) -> Result<Vec<Transaction>, OpError> {
    let creds = TokenValidator::validate(store)?;
    let transactions = client.transactions(&creds).await?;
    let snapshot = transactions.clone();
    if let Err(err) = store.merge(|record| record.transactions = snapshot) {
        debug!("transaction snapshot refresh skipped: {err}");
    }
    Ok(transactions)
}
