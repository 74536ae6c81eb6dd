// --- File: crates/services/slidelink_backend/src/dev_auth.rs ---
//! Development identity shim.
//!
//! Occupies the slot where the production session middleware mounts: it
//! turns `X-Dev-User-Id`/`X-Dev-User-Email` headers into a [`UserIdentity`]
//! request extension so the link endpoint can be exercised locally. Only
//! wired up in debug builds; release builds mount nothing here and `link`
//! answers 401 until a real session layer is installed.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use slidelink_common::models::UserIdentity;

pub async fn dev_identity(mut request: Request, next: Next) -> Response {
    let id = header_value(&request, "x-dev-user-id");
    let email = header_value(&request, "x-dev-user-email");

    if let (Some(user_id), Some(user_email)) = (id, email) {
        request
            .extensions_mut()
            .insert(UserIdentity { user_id, user_email });
    }

    next.run(request).await
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}
