//! Factory for creating pairing attempt repositories
//!
//! Selects the store backend from the application configuration: the SQL
//! store when `use_database` is set (required whenever register, link and
//! exchange are served by more than one process), the in-memory store
//! otherwise.

use crate::error::DbError;
use crate::repositories::pairing_attempt::PairingAttemptRepository;
use crate::repositories::pairing_attempt_memory::MemoryPairingAttemptRepository;
use crate::repositories::pairing_attempt_sql::SqlPairingAttemptRepository;
use crate::DbClient;
use slidelink_config::AppConfig;
use std::sync::Arc;
use tracing::info;

/// Factory for creating pairing attempt repositories
#[derive(Debug, Clone)]
pub struct PairingAttemptRepositoryFactory;

impl PairingAttemptRepositoryFactory {
    /// Create a repository from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when `use_database` is set but the database
    /// configuration is missing or the connection fails.
    pub async fn from_app_config(
        config: &Arc<AppConfig>,
    ) -> Result<Arc<dyn PairingAttemptRepository>, DbError> {
        if config.use_database {
            info!("Using SQL registration store");
            let db_client = DbClient::new(config).await?;
            Ok(Arc::new(SqlPairingAttemptRepository::new(db_client)))
        } else {
            info!("Using in-memory registration store");
            Ok(Arc::new(MemoryPairingAttemptRepository::new()))
        }
    }

    /// Create a SQL repository over an existing database client.
    pub fn sql(db_client: DbClient) -> Arc<dyn PairingAttemptRepository> {
        Arc::new(SqlPairingAttemptRepository::new(db_client))
    }

    /// Create an in-memory repository.
    pub fn in_memory() -> Arc<dyn PairingAttemptRepository> {
        Arc::new(MemoryPairingAttemptRepository::new())
    }
}
