// --- File: crates/slidelink_pairing/src/logic.rs ---
//! The pairing protocol: register, link, exchange.
//!
//! All three operations run against the injected registration store and the
//! injected clock; nothing here reads the wall clock or holds state of its
//! own. Expiry is enforced lazily through `PairingAttempt::is_live` at every
//! access, never through a background sweep.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use slidelink_common::error::HttpStatusCode;
use slidelink_common::models::{LinkedUser, PairingAttempt, UserIdentity};
use slidelink_common::services::Clock;
use slidelink_config::PairingConfig;
use slidelink_db::{DbError, PairingAttemptRepository};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::code::{generate_code, generate_device_id};
use crate::token::mint_bearer_token;

#[derive(Error, Debug)]
pub enum PairingError {
    #[error("Registration failed: {0}")]
    RegistrationFailed(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Authentication required.")]
    AuthenticationRequired,
    /// Unknown code. Deliberately indistinguishable on the wire from
    /// `Expired`, so callers cannot probe which codes ever existed.
    #[error("Invalid or expired pairing code.")]
    NotFound,
    /// Known code past its expiry. Collapsed into `NotFound` at the HTTP
    /// layer; kept distinct here for logs and tests.
    #[error("Invalid or expired pairing code.")]
    Expired,
    #[error("Device does not match pairing code.")]
    InvalidDevice,
    #[error("Pairing code not linked yet.")]
    NotLinked,
    #[error("Pairing code already linked to another account.")]
    AlreadyLinked,
    #[error("Store error: {0}")]
    StoreError(String),
}

impl From<DbError> for PairingError {
    fn from(err: DbError) -> Self {
        PairingError::StoreError(err.to_string())
    }
}

impl HttpStatusCode for PairingError {
    fn status_code(&self) -> u16 {
        match self {
            PairingError::RegistrationFailed(_) => 500,
            PairingError::ValidationError(_) => 400,
            PairingError::AuthenticationRequired => 401,
            // NotFound and Expired share one status on purpose: callers
            // must not be able to probe which codes ever existed
            PairingError::NotFound | PairingError::Expired => 404,
            PairingError::InvalidDevice => 400,
            PairingError::NotLinked => 425,
            PairingError::AlreadyLinked => 409,
            PairingError::StoreError(_) => 500,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterDeviceResponse {
    #[cfg_attr(
        feature = "openapi",
        schema(example = "7b9f6a2e-14d3-4c26-9c5d-0f8a2b6e4d11")
    )]
    pub device_id: String,
    #[cfg_attr(feature = "openapi", schema(example = "XK4M2P"))]
    pub code: String,
    #[cfg_attr(feature = "openapi", schema(example = "2026-08-07T10:30:00Z"))]
    pub expires_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LinkDeviceRequest {
    #[cfg_attr(feature = "openapi", schema(example = "XK4M2P"))]
    #[serde(default)]
    pub code: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LinkDeviceResponse {
    pub success: bool,
    pub device_id: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExchangeTokenRequest {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExchangeTokenResponse {
    #[cfg_attr(feature = "openapi", schema(example = "slt_9f2c..."))]
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Register a new device and hand it a pairing code.
///
/// The code is collision-checked against live attempts: the store refuses
/// duplicates and the registrar retries with a fresh code, up to the
/// configured attempt cap.
pub async fn register_device_logic(
    repository: &dyn PairingAttemptRepository,
    pairing_config: &PairingConfig,
    clock: &dyn Clock,
) -> Result<RegisterDeviceResponse, PairingError> {
    let now = clock.now();
    let expires_at = now + Duration::minutes(pairing_config.code_ttl_minutes);
    let device_id = generate_device_id();

    for attempt_no in 1..=pairing_config.max_code_attempts {
        let code = generate_code(pairing_config.code_length);
        let attempt = PairingAttempt::new(device_id.clone(), code.clone(), now, expires_at);

        if repository.insert(attempt, now).await? {
            info!(
                "Registered pairing attempt for device {} (expires {})",
                device_id, expires_at
            );
            return Ok(RegisterDeviceResponse {
                device_id,
                code,
                expires_at,
            });
        }

        debug!(
            "Pairing code collision, retrying ({}/{})",
            attempt_no, pairing_config.max_code_attempts
        );
    }

    warn!(
        "Could not find a free pairing code after {} attempts",
        pairing_config.max_code_attempts
    );
    Err(PairingError::RegistrationFailed(format!(
        "no free pairing code after {} attempts",
        pairing_config.max_code_attempts
    )))
}

/// Link a pairing code to the authenticated caller's account.
///
/// Caller identity must come from the session middleware; this function
/// never verifies credentials. Relinking by the same account re-confirms
/// idempotently; a different account is rejected.
pub async fn link_device_logic(
    repository: &dyn PairingAttemptRepository,
    identity: UserIdentity,
    request: LinkDeviceRequest,
    clock: &dyn Clock,
) -> Result<LinkDeviceResponse, PairingError> {
    let code = normalize_code(&request.code)?;
    let now = clock.now();

    let attempt = repository
        .find_by_code(&code)
        .await?
        .ok_or(PairingError::NotFound)?;

    if !attempt.is_live(now) {
        // Lazy cleanup of the stale record
        repository.remove_expired(&code, now).await?;
        debug!("Rejected link for expired code {}", code);
        return Err(PairingError::Expired);
    }

    let user = LinkedUser::from(identity);
    let user_id = user.user_id.clone();

    match repository.claim_link(&code, user, now).await? {
        Some(updated) => {
            info!(
                "Linked device {} to user {}",
                updated.device_id, user_id
            );
            Ok(LinkDeviceResponse {
                success: true,
                device_id: updated.device_id,
            })
        }
        None => {
            // The claim was refused; re-read to tell the caller why
            match repository.find_by_code(&code).await? {
                Some(current) if !current.is_live(now) => Err(PairingError::Expired),
                Some(current) if current.is_linked() => {
                    warn!(
                        "Refused link of code {} already held by another account",
                        code
                    );
                    Err(PairingError::AlreadyLinked)
                }
                _ => Err(PairingError::NotFound),
            }
        }
    }
}

/// Exchange a linked pairing code for a bearer token.
///
/// The exchange is single-use: the winning caller's conditional
/// delete-returning removes the attempt, and every later (or racing) caller
/// sees `NotFound`.
pub async fn exchange_token_logic(
    repository: &dyn PairingAttemptRepository,
    pairing_config: &PairingConfig,
    request: ExchangeTokenRequest,
    clock: &dyn Clock,
) -> Result<ExchangeTokenResponse, PairingError> {
    let device_id = request.device_id.trim();
    if device_id.is_empty() {
        return Err(PairingError::ValidationError(
            "deviceId is required".to_string(),
        ));
    }
    let code = normalize_code(&request.code)?;
    let now = clock.now();

    let attempt = repository
        .find_by_code(&code)
        .await?
        .ok_or(PairingError::NotFound)?;

    if !attempt.is_live(now) {
        repository.remove_expired(&code, now).await?;
        debug!("Rejected exchange for expired code {}", code);
        return Err(PairingError::Expired);
    }

    if attempt.device_id != device_id {
        warn!("Device mismatch on exchange for code {}", code);
        return Err(PairingError::InvalidDevice);
    }

    if !attempt.is_linked() {
        return Err(PairingError::NotLinked);
    }

    match repository.claim_exchange(&code, device_id, now).await? {
        Some(claimed) => {
            let issued = mint_bearer_token(now, Duration::hours(pairing_config.token_ttl_hours));
            info!(
                "Issued bearer token for device {} (token expires {})",
                claimed.device_id, issued.expires_at
            );
            Ok(ExchangeTokenResponse {
                token: issued.token,
                expires_at: issued.expires_at,
            })
        }
        // Lost the race: the attempt was redeemed (or expired out)
        // between classification and the claim. The record is gone either
        // way, which is exactly what NotFound means.
        None => Err(PairingError::NotFound),
    }
}

/// Validate and normalize a caller-supplied pairing code.
///
/// Codes are generated uppercase; user-typed input is uppercased so a code
/// read aloud survives the round trip.
fn normalize_code(raw: &str) -> Result<String, PairingError> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(PairingError::ValidationError("code is required".to_string()));
    }
    Ok(code.to_ascii_uppercase())
}
