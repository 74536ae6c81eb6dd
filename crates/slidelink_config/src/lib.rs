//! Configuration loading for the Slidelink services.
//!
//! Configuration is layered: `config/default` first, then an optional
//! `config/{RUN_ENV}` file, then `SLIDELINK__`-prefixed environment
//! variables (double underscore as the nesting separator, e.g.
//! `SLIDELINK__SERVER__PORT=8080`). A `.env` file is honored in
//! development.

use config::{Config, ConfigError, Environment, File};

pub mod models;

pub use models::{AppConfig, DatabaseConfig, PairingConfig, ServerConfig};

/// Load the application configuration.
///
/// # Errors
///
/// Returns a `ConfigError` if a config file is malformed or the merged
/// configuration does not deserialize into [`AppConfig`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    // Load .env first so env overrides below can come from it
    dotenv::dotenv().ok();

    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

    let config = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", run_env)).required(false))
        .add_source(Environment::with_prefix("SLIDELINK").separator("__"))
        .build()?;

    config.try_deserialize()
}
