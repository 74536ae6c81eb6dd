// --- File: crates/slidelink_pairing/src/doc.rs ---
#![allow(dead_code)]
use utoipa::OpenApi;
// Import all relevant schemas from logic.rs
use crate::logic::{
    ExchangeTokenRequest, ExchangeTokenResponse, LinkDeviceRequest, LinkDeviceResponse,
    RegisterDeviceResponse,
};

/// Documentation for the register_device_handler endpoint
/// Issues a fresh device id and short pairing code to an unauthenticated
/// extension installation.
#[utoipa::path(
    post,
    path = "/pairing/register", // Path relative to /api
    responses(
        (status = 200, description = "Pairing attempt created, code returned", body = RegisterDeviceResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Device Pairing"
)]
fn doc_register_device_handler() {}

/// Documentation for the link_device_handler endpoint
/// Lets a signed-in dashboard user claim a pairing code for their account.
#[utoipa::path(
    post,
    path = "/pairing/link", // Path relative to /api
    request_body(content = LinkDeviceRequest, example = json!({
        "code": "XK4M2P"
    })),
    responses(
        (status = 200, description = "Code linked to the caller's account", body = LinkDeviceResponse),
        (status = 400, description = "Code missing from request"),
        (status = 401, description = "Caller is not signed in"),
        (status = 404, description = "Code unknown or expired"),
        (status = 409, description = "Code already linked to another account"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Device Pairing"
)]
fn doc_link_device_handler() {}

/// Documentation for the exchange_token_handler endpoint
/// Converts a linked pairing code into a bearer token. Single-use: the
/// pairing attempt is deleted on success.
#[utoipa::path(
    post,
    path = "/pairing/exchange", // Path relative to /api
    request_body(content = ExchangeTokenRequest, example = json!({
        "deviceId": "7b9f6a2e-14d3-4c26-9c5d-0f8a2b6e4d11",
        "code": "XK4M2P"
    })),
    responses(
        (status = 200, description = "Bearer token issued", body = ExchangeTokenResponse),
        (status = 400, description = "Parameters missing or device mismatch"),
        (status = 404, description = "Code unknown, expired or already redeemed"),
        (status = 425, description = "Code not linked yet; poll again"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Device Pairing"
)]
fn doc_exchange_token_handler() {}

/// OpenAPI documentation for the Device Pairing API
#[derive(OpenApi)]
#[openapi(
    paths(
        doc_register_device_handler,
        doc_link_device_handler,
        doc_exchange_token_handler
    ),
    components(
        schemas(
            RegisterDeviceResponse,
            LinkDeviceRequest,
            LinkDeviceResponse,
            ExchangeTokenRequest,
            ExchangeTokenResponse
        )
    ),
    tags(
        (name = "Device Pairing", description = "API for pairing extension installations with dashboard accounts")
    )
)]
pub struct PairingApiDoc;
