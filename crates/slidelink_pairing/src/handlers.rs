// --- File: crates/slidelink_pairing/src/handlers.rs ---
use crate::auth::AuthenticatedUser;
use crate::logic::{
    exchange_token_logic, link_device_logic, register_device_logic, ExchangeTokenRequest,
    ExchangeTokenResponse, LinkDeviceRequest, LinkDeviceResponse, PairingError,
    RegisterDeviceResponse,
};
use axum::{extract::State, http::StatusCode, response::Json};
use slidelink_common::error::HttpStatusCode;
use slidelink_common::services::Clock;
use slidelink_config::AppConfig;
use slidelink_db::PairingAttemptRepository;
use std::sync::Arc;

// State for pairing handlers
#[derive(Clone)]
pub struct PairingState {
    pub config: Arc<AppConfig>,
    pub repository: Arc<dyn PairingAttemptRepository>,
    pub clock: Arc<dyn Clock>,
}

/// Map a protocol error onto the wire contract.
///
/// Status codes come from the error's `HttpStatusCode` impl. `NotFound` and
/// `Expired` share one status and one body, so callers cannot tell a code
/// that never existed from one that timed out or was already redeemed.
fn error_response(err: PairingError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = match &err {
        // Store internals never go over the wire
        PairingError::RegistrationFailed(_) | PairingError::StoreError(_) => {
            "Internal server error.".to_string()
        }
        _ => err.to_string(),
    };
    (status, message)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/pairing/register", // Relative to /api
    responses(
        (status = 200, description = "Pairing attempt created, code returned", body = RegisterDeviceResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Device Pairing"
))]
pub async fn register_device_handler(
    State(state): State<Arc<PairingState>>,
) -> Result<Json<RegisterDeviceResponse>, (StatusCode, String)> {
    register_device_logic(
        state.repository.as_ref(),
        &state.config.pairing,
        state.clock.as_ref(),
    )
    .await
    .map(Json)
    .map_err(error_response)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/pairing/link", // Relative to /api
    request_body = LinkDeviceRequest,
    responses(
        (status = 200, description = "Code linked to the caller's account", body = LinkDeviceResponse),
        (status = 400, description = "Code missing from request"),
        (status = 401, description = "Caller is not signed in"),
        (status = 404, description = "Code unknown or expired"),
        (status = 409, description = "Code already linked to another account"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Device Pairing"
))]
pub async fn link_device_handler(
    State(state): State<Arc<PairingState>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(payload): Json<LinkDeviceRequest>,
) -> Result<Json<LinkDeviceResponse>, (StatusCode, String)> {
    link_device_logic(
        state.repository.as_ref(),
        identity,
        payload,
        state.clock.as_ref(),
    )
    .await
    .map(Json)
    .map_err(error_response)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/pairing/exchange", // Relative to /api
    request_body = ExchangeTokenRequest,
    responses(
        (status = 200, description = "Bearer token issued; the pairing attempt is consumed", body = ExchangeTokenResponse),
        (status = 400, description = "Parameters missing or device mismatch"),
        (status = 404, description = "Code unknown, expired or already redeemed"),
        (status = 425, description = "Code not linked yet; poll again"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Device Pairing"
))]
pub async fn exchange_token_handler(
    State(state): State<Arc<PairingState>>,
    Json(payload): Json<ExchangeTokenRequest>,
) -> Result<Json<ExchangeTokenResponse>, (StatusCode, String)> {
    exchange_token_logic(
        state.repository.as_ref(),
        &state.config.pairing,
        payload,
        state.clock.as_ref(),
    )
    .await
    .map(Json)
    .map_err(error_response)
}
