// --- File: crates/slidelink_pairing/src/token.rs ---
//! Bearer token minting.
//!
//! Tokens are opaque credentials; the session middleware that later accepts
//! them is an external collaborator. Only issuance lives here.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use slidelink_common::models::IssuedToken;

/// Prefix on every issued credential, so leaked strings can be recognized
/// and revoked by scanners.
pub const TOKEN_PREFIX: &str = "slt_";

/// Number of random bytes behind a token (256 bits).
const TOKEN_ENTROPY_BYTES: usize = 32;

/// Mint a new bearer token valid for `ttl` from `now`.
pub fn mint_bearer_token(now: DateTime<Utc>, ttl: Duration) -> IssuedToken {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);

    IssuedToken {
        token: format!("{}{}", TOKEN_PREFIX, hex::encode(bytes)),
        expires_at: now + ttl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_tokens_carry_prefix_and_expiry() {
        let now = Utc::now();
        let issued = mint_bearer_token(now, Duration::hours(720));

        assert!(issued.token.starts_with(TOKEN_PREFIX));
        assert_eq!(issued.token.len(), TOKEN_PREFIX.len() + TOKEN_ENTROPY_BYTES * 2);
        assert_eq!(issued.expires_at, now + Duration::hours(720));
    }

    #[test]
    fn minted_tokens_do_not_repeat() {
        let now = Utc::now();
        let a = mint_bearer_token(now, Duration::hours(1));
        let b = mint_bearer_token(now, Duration::hours(1));
        assert_ne!(a.token, b.token);
    }
}
