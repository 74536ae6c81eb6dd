// --- File: crates/slidelink_pairing/src/auth.rs ---
//! Authenticated-caller extraction for the link endpoint.
//!
//! Credential verification is the session middleware's job; by the time a
//! request reaches this crate the middleware has either inserted a
//! [`UserIdentity`] into the request extensions or it hasn't. The extractor
//! only surfaces that fact as a typed 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use slidelink_common::models::UserIdentity;

use crate::logic::PairingError;

/// The verified identity of the caller, pulled from request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserIdentity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserIdentity>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or((
                StatusCode::UNAUTHORIZED,
                PairingError::AuthenticationRequired.to_string(),
            ))
    }
}
