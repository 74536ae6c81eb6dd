// --- File: crates/slidelink_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g., DATABASE_URL loaded via SLIDELINK__DATABASE__URL
}

// --- Pairing Config ---
// Knobs for the device pairing handshake. Every field has a default so a
// bare config file still yields a working service.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PairingConfig {
    /// How long a pairing code stays redeemable, in minutes.
    #[serde(default = "default_code_ttl_minutes")]
    pub code_ttl_minutes: i64,
    /// Number of characters in a pairing code.
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    /// How many fresh codes the registrar tries before giving up on a
    /// collision streak.
    #[serde(default = "default_max_code_attempts")]
    pub max_code_attempts: u32,
    /// Lifetime of an issued bearer token, in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_code_ttl_minutes() -> i64 {
    10
}

fn default_code_length() -> usize {
    6
}

fn default_max_code_attempts() -> u32 {
    5
}

fn default_token_ttl_hours() -> i64 {
    720 // 30 days
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: default_code_ttl_minutes(),
            code_length: default_code_length(),
            max_code_attempts: default_max_code_attempts(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    /// When set, pairing attempts live in the shared SQL store instead of
    /// process memory. Required for multi-process deployments.
    #[serde(default)]
    pub use_database: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub pairing: PairingConfig,
}
