//! Bearer-token check for the HTTP surface (spec §6 401).
//!
//! Issuing the token is explicitly out of scope: this validates a token an
//! upstream SSO-fronted gateway already resolved, against a single shared
//! deployment secret named by [`bestbox_config::AuthSection::api_key_env`].
//! Comparison runs through a fixed-width digest so two tokens of different
//! lengths don't leak a length oracle through early-exit comparison.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// `axum::middleware::from_fn_with_state` layer enforcing the configured
/// bearer token, if any. No-op when `auth.api_key_env` is unset.
pub async fn require_bearer_token(State(state): State<AppState>, request: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let Some(expected) = state.api_key.as_ref() else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match provided {
        Some(token) if tokens_match(token, expected) => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

fn tokens_match(provided: &str, expected: &str) -> bool {
    let provided_digest = Sha256::digest(provided.as_bytes());
    let expected_digest = Sha256::digest(expected.as_bytes());
    provided_digest.ct_eq(&expected_digest).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_tokens_compare_equal() {
        assert!(tokens_match("secret-123", "secret-123"));
    }

    #[test]
    fn differing_tokens_compare_unequal() {
        assert!(!tokens_match("secret-123", "secret-124"));
        assert!(!tokens_match("short", "a-much-longer-token"));
    }
}
