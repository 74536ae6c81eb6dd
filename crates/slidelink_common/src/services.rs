// --- File: crates/slidelink_common/src/services.rs ---
//! Service abstractions shared across the workspace.
//!
//! This module provides trait definitions for collaborators the pairing core
//! depends on but does not own. These traits allow for dependency injection
//! and easier testing by decoupling the protocol logic from wall-clock time
//! and from concrete transport/storage implementations.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A source of "now" for expiry comparisons.
///
/// Every expiry decision in the protocol goes through one of these, so tests
/// can pin time instead of racing the wall clock.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The production clock.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
