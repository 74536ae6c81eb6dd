//! Repository for pairing attempts
//!
//! This module defines the interface of the registration store: a keyed map
//! of outstanding pairing attempts, keyed by pairing code. Every method that
//! mutates the store is atomic with respect to its code, which is what the
//! protocol's single-redemption and monotonic-link invariants rest on.

use crate::error::DbError;
use chrono::{DateTime, Utc};
use slidelink_common::models::LinkedUser;
use slidelink_common::services::BoxFuture;

// Re-export PairingAttempt from slidelink_common for convenience
pub use slidelink_common::models::PairingAttempt;

/// Repository for pairing attempts
///
/// Implementations must guarantee per-key atomicity: no interleaving of two
/// calls for the same code may observe or produce a state that a serial
/// execution could not. Cross-key operations need no coordination.
pub trait PairingAttemptRepository: Send + Sync {
    /// Initialize the backing schema, if the backend has one.
    ///
    /// Safe to call repeatedly; a no-op for backends without a schema.
    fn init_schema(&self) -> BoxFuture<'_, (), DbError>;

    /// Insert a new, unlinked pairing attempt.
    ///
    /// Returns `false` without touching the store when a live attempt
    /// already holds the same code, so the registrar can retry with a fresh
    /// code. An expired attempt occupying the code is evicted and replaced.
    fn insert<'a>(
        &'a self,
        attempt: PairingAttempt,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, bool, DbError>;

    /// Look up an attempt by its code. Read-only; never mutates.
    fn find_by_code<'a>(
        &'a self,
        code: &'a str,
    ) -> BoxFuture<'a, Option<PairingAttempt>, DbError>;

    /// Atomically link an attempt to a user.
    ///
    /// Succeeds when the attempt is present, not expired at `now`, and
    /// either unlinked or already linked to this same `user` (idempotent
    /// re-confirmation). Returns the updated attempt, or `None` when no
    /// record satisfies the condition. The link transition is monotonic:
    /// a linked attempt is never returned to the unlinked state.
    fn claim_link<'a>(
        &'a self,
        code: &'a str,
        user: LinkedUser,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Option<PairingAttempt>, DbError>;

    /// Atomically remove and return an attempt that is ready for exchange.
    ///
    /// The attempt must be linked, not expired at `now`, and registered to
    /// `device_id`. This is a single conditional delete-returning: of N
    /// racing callers, at most one receives `Some`.
    fn claim_exchange<'a>(
        &'a self,
        code: &'a str,
        device_id: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Option<PairingAttempt>, DbError>;

    /// Remove an attempt only if it is expired at `now`.
    ///
    /// Used for lazy cleanup when a stale record is observed. The expiry
    /// condition is re-checked atomically with the delete, so a live
    /// attempt that re-acquired the code in the meantime is never touched.
    /// Returns whether a record was deleted.
    fn remove_expired<'a>(
        &'a self,
        code: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, bool, DbError>;

    /// Delete every attempt whose expiry is at or before `now`.
    ///
    /// Hygiene only; expiry is enforced lazily at access time and never
    /// depends on this sweep running.
    fn purge_expired(&self, now: DateTime<Utc>) -> BoxFuture<'_, u64, DbError>;
}
