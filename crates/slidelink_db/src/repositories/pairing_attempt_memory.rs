//! In-memory implementation of the pairing attempt repository
//!
//! Backs the registration store with a mutex-guarded map. Each trait call
//! takes the lock exactly once and performs its whole check-and-mutate
//! sequence under it, which makes every operation atomic per key. Suitable
//! for tests and single-process deployments; multi-process deployments need
//! the SQL store, since link and exchange arrive on different requests.

use crate::error::DbError;
use crate::repositories::pairing_attempt::{PairingAttempt, PairingAttemptRepository};
use chrono::{DateTime, Utc};
use slidelink_common::models::LinkedUser;
use slidelink_common::services::BoxFuture;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// In-memory pairing attempt repository
#[derive(Debug, Default)]
pub struct MemoryPairingAttemptRepository {
    attempts: Mutex<HashMap<String, PairingAttempt>>,
}

impl MemoryPairingAttemptRepository {
    /// Create a new, empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, PairingAttempt>>, DbError> {
        self.attempts
            .lock()
            .map_err(|_| DbError::Other("pairing attempt map lock poisoned".to_string()))
    }

    /// Number of attempts currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.attempts.lock().map(|map| map.len()).unwrap_or(0)
    }

    /// Whether the store holds no attempts at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PairingAttemptRepository for MemoryPairingAttemptRepository {
    fn init_schema(&self) -> BoxFuture<'_, (), DbError> {
        // Nothing to set up for a map
        Box::pin(async { Ok(()) })
    }

    fn insert<'a>(
        &'a self,
        attempt: PairingAttempt,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, bool, DbError> {
        Box::pin(async move {
            let mut map = self.lock()?;
            if let Some(existing) = map.get(&attempt.code) {
                if existing.is_live(now) {
                    debug!("Pairing code collision for code: {}", attempt.code);
                    return Ok(false);
                }
                // Expired occupant, evict and reuse the code
            }
            map.insert(attempt.code.clone(), attempt);
            Ok(true)
        })
    }

    fn find_by_code<'a>(
        &'a self,
        code: &'a str,
    ) -> BoxFuture<'a, Option<PairingAttempt>, DbError> {
        Box::pin(async move {
            let map = self.lock()?;
            Ok(map.get(code).cloned())
        })
    }

    fn claim_link<'a>(
        &'a self,
        code: &'a str,
        user: LinkedUser,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Option<PairingAttempt>, DbError> {
        Box::pin(async move {
            let mut map = self.lock()?;
            match map.get_mut(code) {
                Some(attempt) if attempt.is_live(now) => match &attempt.linked_user {
                    None => {
                        attempt.linked_user = Some(user);
                        Ok(Some(attempt.clone()))
                    }
                    Some(existing) if existing.user_id == user.user_id => {
                        // Idempotent re-confirmation by the same account
                        Ok(Some(attempt.clone()))
                    }
                    Some(_) => Ok(None),
                },
                _ => Ok(None),
            }
        })
    }

    fn claim_exchange<'a>(
        &'a self,
        code: &'a str,
        device_id: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Option<PairingAttempt>, DbError> {
        Box::pin(async move {
            let mut map = self.lock()?;
            let ready = matches!(
                map.get(code),
                Some(attempt)
                    if attempt.device_id == device_id
                        && attempt.is_linked()
                        && attempt.is_live(now)
            );
            if ready {
                Ok(map.remove(code))
            } else {
                Ok(None)
            }
        })
    }

    fn remove_expired<'a>(
        &'a self,
        code: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, bool, DbError> {
        Box::pin(async move {
            let mut map = self.lock()?;
            let stale = matches!(map.get(code), Some(attempt) if !attempt.is_live(now));
            if stale {
                map.remove(code);
            }
            Ok(stale)
        })
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> BoxFuture<'_, u64, DbError> {
        Box::pin(async move {
            let mut map = self.lock()?;
            let before = map.len();
            map.retain(|_, attempt| attempt.is_live(now));
            let purged = (before - map.len()) as u64;
            if purged > 0 {
                debug!("Purged {} expired pairing attempts", purged);
            }
            Ok(purged)
        })
    }
}
