//! HTTP client for the banking REST API.
//!
//! Authenticated calls carry the bearer token and its expiration as headers
//! (`token`, `token-expiration`); the user id travels explicitly in the
//! query or body, matching the server's contract. Responses use a JSON
//! envelope with a `status` discriminator and a `message` field. HTTP status
//! is checked first, then the body-level discriminator.

pub mod types;

use crate::auth::ValidatedCredentials;
use crate::session::{Transaction, Wallet};
use crate::APP_USER_AGENT;
use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

pub use types::{Card, DepositInit, LoginResponse, Ticket, TokenTransferInit};

const GENERIC_FAILURE: &str = "Something went wrong, please try again";

/// Remote call failures, kept distinct so callers can tell "server rejected"
/// from "request never arrived".
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid server response: {0}")]
    InvalidResponse(String),
}

/// Terminal classification of a financial action, rendered by the shared
/// outcome screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { message: String },
    Pending { message: String },
    Failed { message: String },
}

impl Outcome {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message } | Self::Pending { message } | Self::Failed { message } => {
                message
            }
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Outcome plus the envelope `data` payload, for operations whose follow-up
/// needs server-issued fields (checkout URLs, control numbers).
#[derive(Debug)]
pub struct OperationResponse {
    pub outcome: Outcome,
    pub data: Value,
}

/// Classify a 2xx envelope body into a terminal outcome.
#[must_use]
pub fn classify(body: &Value) -> Outcome {
    let message = body["message"].as_str();
    let status = body["status"].as_str();
    // Some endpoints use a boolean `success` instead of `status`.
    let success_flag = body["success"].as_bool();
    match (status, success_flag) {
        (Some("success"), _) | (None, Some(true)) => Outcome::Success {
            message: message.unwrap_or("Transaction completed").to_string(),
        },
        (Some("pending"), _) => Outcome::Pending {
            message: message.unwrap_or("Transaction is processing").to_string(),
        },
        _ => Outcome::Failed {
            message: message.unwrap_or(GENERIC_FAILURE).to_string(),
        },
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client against `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(base_url)?;
        let scheme = url.scheme();
        let host = url
            .host()
            .ok_or_else(|| anyhow!("Error parsing URL: no host specified"))?
            .to_owned();
        let port = match url.port() {
            Some(p) => p,
            None => match scheme {
                "http" => 80,
                "https" => 443,
                _ => return Err(anyhow!("Error parsing URL: unsupported scheme {}", scheme)),
            },
        };
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: format!("{scheme}://{host}:{port}"),
        })
    }

    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send the request, enforce HTTP status, and return the parsed body.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        if !status.is_success() {
            let message = body["message"]
                .as_str()
                .unwrap_or(GENERIC_FAILURE)
                .to_string();
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    /// Returns `Rejected` on bad credentials or `InvalidResponse` if the
    /// session payload cannot be parsed.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
        device_id: &str,
    ) -> Result<LoginResponse, ApiError> {
        let payload = json!({
            "email": email,
            "password": password.expose_secret(),
            "device_id": device_id,
        });
        let body = self
            .execute(self.http.post(self.endpoint_url("/login")).json(&payload))
            .await?;
        serde_json::from_value(body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    /// Register a new account. The response carries the same session payload
    /// as login.
    ///
    /// # Errors
    /// Returns `Rejected` on validation failure or `InvalidResponse` if the
    /// payload cannot be parsed.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
        phone: &str,
        first_name: &str,
        last_name: &str,
        device_id: &str,
    ) -> Result<LoginResponse, ApiError> {
        let payload = json!({
            "email": email,
            "password": password.expose_secret(),
            "phone": phone,
            "first_name": first_name,
            "last_name": last_name,
            "device_id": device_id,
        });
        let body = self
            .execute(
                self.http
                    .post(self.endpoint_url("/register"))
                    .json(&payload),
            )
            .await?;
        serde_json::from_value(body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    fn authed_post(&self, path: &str, creds: &ValidatedCredentials) -> reqwest::RequestBuilder {
        self.http
            .post(self.endpoint_url(path))
            .header("token", &creds.token)
            .header("token-expiration", &creds.token_expiration)
    }

    fn authed_get(&self, path: &str, creds: &ValidatedCredentials) -> reqwest::RequestBuilder {
        self.http
            .get(self.endpoint_url(path))
            .header("token", &creds.token)
            .header("token-expiration", &creds.token_expiration)
            .query(&[("user_id", creds.user_id.as_str())])
    }

    /// Perform a money-moving POST and classify the response.
    ///
    /// # Errors
    /// Returns `Transport` or `Rejected`; business failures come back as an
    /// `Outcome::Failed`, not an error.
    #[instrument(skip(self, creds, payload))]
    pub async fn post_operation(
        &self,
        path: &str,
        creds: &ValidatedCredentials,
        payload: &Value,
    ) -> Result<OperationResponse, ApiError> {
        let body = self
            .execute(self.authed_post(path, creds).json(payload))
            .await?;
        let outcome = classify(&body);
        debug!("operation {path} -> {:?}", outcome);
        let data = body.get("data").cloned().unwrap_or(Value::Null);
        Ok(OperationResponse { outcome, data })
    }

    /// Authenticated GET returning the envelope `data` payload.
    ///
    /// # Errors
    /// Returns `Transport` or `Rejected`.
    pub async fn get_data(
        &self,
        path: &str,
        creds: &ValidatedCredentials,
    ) -> Result<Value, ApiError> {
        let body = self.execute(self.authed_get(path, creds)).await?;
        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }

    /// Fetch the wallet snapshot.
    ///
    /// # Errors
    /// Returns `Transport`, `Rejected` or `InvalidResponse`.
    pub async fn wallets(&self, creds: &ValidatedCredentials) -> Result<Vec<Wallet>, ApiError> {
        let data = self.get_data("/wallets", creds).await?;
        serde_json::from_value(data).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    /// Fetch the transaction snapshot.
    ///
    /// # Errors
    /// Returns `Transport`, `Rejected` or `InvalidResponse`.
    pub async fn transactions(
        &self,
        creds: &ValidatedCredentials,
    ) -> Result<Vec<Transaction>, ApiError> {
        let data = self.get_data("/transactions", creds).await?;
        serde_json::from_value(data).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    /// List virtual cards.
    ///
    /// # Errors
    /// Returns `Transport`, `Rejected` or `InvalidResponse`.
    pub async fn cards(&self, creds: &ValidatedCredentials) -> Result<Vec<Card>, ApiError> {
        let data = self.get_data("/cards", creds).await?;
        serde_json::from_value(data).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    /// List support tickets.
    ///
    /// # Errors
    /// Returns `Transport`, `Rejected` or `InvalidResponse`.
    pub async fn tickets(&self, creds: &ValidatedCredentials) -> Result<Vec<Ticket>, ApiError> {
        let data = self.get_data("/tickets", creds).await?;
        serde_json::from_value(data).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_success() {
        let body = json!({"status": "success", "message": "Transfer sent"});
        assert_eq!(
            classify(&body),
            Outcome::Success {
                message: "Transfer sent".to_string()
            }
        );
    }

    #[test]
    fn classify_pending() {
        let body = json!({"status": "pending"});
        assert_eq!(
            classify(&body),
            Outcome::Pending {
                message: "Transaction is processing".to_string()
            }
        );
    }

    #[test]
    fn classify_failure_uses_server_message() {
        let body = json!({"status": "failed", "message": "Insufficient balance"});
        assert_eq!(
            classify(&body),
            Outcome::Failed {
                message: "Insufficient balance".to_string()
            }
        );
    }

    #[test]
    fn classify_failure_falls_back_to_generic_message() {
        let body = json!({"status": "error"});
        assert_eq!(
            classify(&body),
            Outcome::Failed {
                message: GENERIC_FAILURE.to_string()
            }
        );
    }

    #[test]
    fn classify_boolean_success_flag() {
        let body = json!({"success": true, "message": "ok"});
        assert!(classify(&body).is_success());
    }

    #[test]
    fn endpoint_url_normalizes_port() {
        let client = ApiClient::new("https://api.tumapay.dev", Duration::from_secs(30)).unwrap();
        assert_eq!(
            client.endpoint_url("/login"),
            "https://api.tumapay.dev:443/login"
        );
    }

    #[test]
    fn rejects_unsupported_scheme() {
        assert!(ApiClient::new("ftp://api.tumapay.dev", Duration::from_secs(30)).is_err());
    }
}
