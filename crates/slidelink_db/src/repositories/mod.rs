//! Repository modules for the registration store
//!
//! This module contains the pairing attempt repository trait and its
//! in-memory and SQL implementations.

pub mod pairing_attempt;
pub mod pairing_attempt_factory;
pub mod pairing_attempt_memory;
pub mod pairing_attempt_sql;

// Re-export the pairing attempt repository types for ease of use
pub use pairing_attempt::{PairingAttempt, PairingAttemptRepository};
pub use pairing_attempt_factory::PairingAttemptRepositoryFactory;
pub use pairing_attempt_memory::MemoryPairingAttemptRepository;
pub use pairing_attempt_sql::SqlPairingAttemptRepository;
