// --- File: crates/slidelink_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod logging; // Logging utilities
pub mod models; // Shared data structures
pub mod services; // Service abstractions

// Re-export error utilities for easier access
pub use error::HttpStatusCode;

// Re-export the shared models for easier access
pub use models::{IssuedToken, LinkedUser, PairingAttempt, UserIdentity};

// Re-export service abstractions for easier access
pub use services::{BoxFuture, Clock, SystemClock};
