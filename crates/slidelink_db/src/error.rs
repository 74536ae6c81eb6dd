//! Error types for the registration store

use thiserror::Error;

/// Errors that can occur when working with the registration store
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the store configuration
    #[error("Store configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with a store query
    #[error("Store query error: {0}")]
    QueryError(String),

    /// Other errors
    #[error("Other store error: {0}")]
    Other(String),
}
