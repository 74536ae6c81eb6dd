//! Registration store for Slidelink device pairing
//!
//! This crate owns the one shared mutable resource of the pairing protocol:
//! the keyed map of outstanding pairing attempts. The store is exposed as a
//! repository trait with per-key atomic operations, with two backends behind
//! it: an in-memory map (tests, single-process deployments) and a SQL table
//! reached through SQLx's database-agnostic `Any` driver (SQLite,
//! PostgreSQL and MySQL via feature flags).
//!
//! # Usage
//!
//! ```rust,no_run
//! use slidelink_config::AppConfig;
//! use slidelink_db::PairingAttemptRepositoryFactory;
//! use std::sync::Arc;
//!
//! async fn setup_store(config: Arc<AppConfig>) -> Result<(), Box<dyn std::error::Error>> {
//!     let repository = PairingAttemptRepositoryFactory::from_app_config(&config).await?;
//!     repository.init_schema().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

// Register the SQLite driver when the crate is loaded
#[cfg(feature = "sqlite")]
mod sqlite_driver {
    // This import ensures the SQLite driver is linked and registered
    #[allow(unused_imports)]
    use sqlx::sqlite::SqlitePoolOptions as _;
}

// Re-export the client and repository types for ease of use
pub use client::DbClient;
pub use error::DbError;
pub use repositories::{
    MemoryPairingAttemptRepository, PairingAttempt, PairingAttemptRepository,
    PairingAttemptRepositoryFactory, SqlPairingAttemptRepository,
};
