// --- File: crates/services/slidelink_backend/src/app_state.rs ---
use slidelink_common::services::{Clock, SystemClock};
use slidelink_config::AppConfig;
use slidelink_db::{DbError, PairingAttemptRepository, PairingAttemptRepositoryFactory};
use std::sync::Arc;

/// Application state shared across all routes.
///
/// Holds the loaded configuration plus the two injected collaborators of the
/// pairing core: the registration store and the clock. Everything is behind
/// an `Arc` so the router, the expiry sweep and the handlers share one
/// instance of each.
#[derive(Clone)]
pub struct AppState {
    /// The application configuration loaded at startup.
    pub config: Arc<AppConfig>,

    /// The registration store backing register/link/exchange.
    pub repository: Arc<dyn PairingAttemptRepository>,

    /// Source of "now" for every expiry decision.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Build the state from configuration: select the store backend and
    /// make sure its schema exists.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, DbError> {
        let repository = PairingAttemptRepositoryFactory::from_app_config(&config).await?;
        repository.init_schema().await?;

        Ok(Self {
            config,
            repository,
            clock: Arc::new(SystemClock),
        })
    }
}
