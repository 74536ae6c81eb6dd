// --- File: crates/slidelink_pairing/src/routes.rs ---
use crate::handlers::{
    exchange_token_handler, link_device_handler, register_device_handler, PairingState,
};
use axum::{routing::post, Router};
use slidelink_common::services::Clock;
use slidelink_config::AppConfig;
use slidelink_db::PairingAttemptRepository;
use std::sync::Arc;

pub fn routes(
    config: Arc<AppConfig>,
    repository: Arc<dyn PairingAttemptRepository>,
    clock: Arc<dyn Clock>,
) -> Router {
    let pairing_state = Arc::new(PairingState {
        config,
        repository,
        clock,
    });

    Router::new()
        .route("/pairing/register", post(register_device_handler))
        .route("/pairing/link", post(link_device_handler))
        .route("/pairing/exchange", post(exchange_token_handler))
        .with_state(pairing_state)
}
