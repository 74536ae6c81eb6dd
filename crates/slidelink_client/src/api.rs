// --- File: crates/slidelink_client/src/api.rs ---
//! Transport for the exchange endpoint.
//!
//! The poller only sees [`ExchangeApi`], so tests drive the state machine
//! with a scripted implementation and the extension runtime plugs in the
//! HTTP one.

use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Serialize;
use slidelink_common::models::IssuedToken;
use slidelink_common::services::BoxFuture;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A static HTTP client reused across all exchange calls.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
});

/// What one exchange call told us.
///
/// Every variant except `NotLinked` ends the polling loop.
#[derive(Debug, Clone)]
pub enum ExchangeOutcome {
    /// The code was linked and redeemed; here is the credential.
    Issued(IssuedToken),
    /// Valid code, nobody has linked it yet. Poll again.
    NotLinked,
    /// The code is unknown, expired or already redeemed. Terminal.
    NotFound,
    /// The server refused the request outright (missing parameters or a
    /// device mismatch). Terminal; retrying the same request cannot help.
    Rejected(String),
}

/// Errors raised by the transport itself, as opposed to protocol outcomes.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Transport(String),
    #[error("Unexpected response ({status}): {message}")]
    UnexpectedResponse { status: u16, message: String },
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// The exchange endpoint as the poller sees it.
pub trait ExchangeApi: Send + Sync {
    /// Present `{deviceId, code}` and report what came back.
    fn exchange<'a>(
        &'a self,
        device_id: &'a str,
        code: &'a str,
    ) -> BoxFuture<'a, ExchangeOutcome, ClientError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRequestBody<'a> {
    device_id: &'a str,
    code: &'a str,
}

/// HTTP implementation of [`ExchangeApi`] against the Slidelink API.
#[derive(Debug, Clone)]
pub struct HttpExchangeApi {
    base_url: String,
}

impl HttpExchangeApi {
    /// Create a client against an API base URL such as
    /// `https://api.slidelink.app/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }
}

impl ExchangeApi for HttpExchangeApi {
    fn exchange<'a>(
        &'a self,
        device_id: &'a str,
        code: &'a str,
    ) -> BoxFuture<'a, ExchangeOutcome, ClientError> {
        Box::pin(async move {
            let url = format!("{}/pairing/exchange", self.base_url);
            let response = HTTP_CLIENT
                .post(&url)
                .json(&ExchangeRequestBody { device_id, code })
                .send()
                .await?;

            let status = response.status();
            debug!("Exchange call returned status {}", status);

            match status.as_u16() {
                200 => {
                    let token: IssuedToken = response
                        .json()
                        .await
                        .map_err(|e| ClientError::Parse(e.to_string()))?;
                    Ok(ExchangeOutcome::Issued(token))
                }
                425 => Ok(ExchangeOutcome::NotLinked),
                404 => Ok(ExchangeOutcome::NotFound),
                400 => {
                    let message = response.text().await.unwrap_or_default();
                    Ok(ExchangeOutcome::Rejected(message))
                }
                code => {
                    let message = response.text().await.unwrap_or_default();
                    Err(ClientError::UnexpectedResponse {
                        status: code,
                        message,
                    })
                }
            }
        })
    }
}
