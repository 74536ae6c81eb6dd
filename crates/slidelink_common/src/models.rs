// --- File: crates/slidelink_common/src/models.rs ---

// This file contains data structures shared between the pairing service and
// the extension-side client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The verified identity of an authenticated dashboard user.
///
/// Produced by the session middleware in front of the API and carried as a
/// request extension; this workspace never verifies credentials itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    /// The account's stable user ID
    pub user_id: String,

    /// The account's email address
    pub user_email: String,
}

/// The account a pairing attempt was linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedUser {
    /// The user ID the eventual bearer token will be scoped to
    pub user_id: String,

    /// The email of that account, echoed back to the extension UI
    pub user_email: String,
}

impl From<UserIdentity> for LinkedUser {
    fn from(identity: UserIdentity) -> Self {
        Self {
            user_id: identity.user_id,
            user_email: identity.user_email,
        }
    }
}

/// One device's in-progress pairing handshake.
///
/// Created unlinked by the registrar, linked at most once by an
/// authenticated dashboard user, and deleted either on successful token
/// exchange or on first access after `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingAttempt {
    /// Opaque identifier for one extension installation
    pub device_id: String,

    /// Short human-typeable code; the lookup key in the store
    pub code: String,

    /// When this attempt was created
    pub created_at: DateTime<Utc>,

    /// Hard deadline; the attempt is invalid after this regardless of state
    pub expires_at: DateTime<Utc>,

    /// Present once an authenticated user has claimed the code.
    /// The transition is monotonic: `None` -> `Some`, never back.
    pub linked_user: Option<LinkedUser>,
}

impl PairingAttempt {
    /// Create a new, unlinked pairing attempt.
    pub fn new(
        device_id: String,
        code: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            device_id,
            code,
            created_at,
            expires_at,
            linked_user: None,
        }
    }

    /// Whether the attempt has been claimed by a user.
    pub fn is_linked(&self) -> bool {
        self.linked_user.is_some()
    }

    /// The single liveness predicate used by both the linker and the
    /// exchanger. An attempt is live strictly before its expiry instant.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// A bearer token issued at the end of a successful exchange.
///
/// Serializes in the wire casing of the exchange endpoint, so the extension
/// client deserializes responses straight into it. Validation of the token
/// on later API calls is handled by the session middleware, not by this
/// workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    /// The opaque credential string
    pub token: String,

    /// When the credential stops being accepted
    pub expires_at: DateTime<Utc>,
}
