//! Orchestrator token checks
//!
//! Tokens are compared by their SHA-256 digests so the comparison does not
//! depend on where the first mismatching byte is. Only fingerprints ever reach
//! the logs.

use crate::error::{ApiError, ApiResult};
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use storeforge_provisioner::TOKEN_HEADER;

/// Underscore spelling some proxies and clients produce
const TOKEN_HEADER_ALT: &str = "x_orchestrator_token";

/// Log-safe token description: length and a short digest prefix
pub fn fingerprint(token: &str) -> String {
    let digest = hex::encode(Sha256::digest(token.as_bytes()));
    format!("len={} sha256={}", token.len(), &digest[..10])
}

pub fn tokens_match(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Token presented on a request, if any
pub fn presented_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TOKEN_HEADER)
        .or_else(|| headers.get(TOKEN_HEADER_ALT))
        .and_then(|value| value.to_str().ok())
}

/// Require the orchestrator token on a request
pub fn authorize(headers: &HeaderMap, expected: &str) -> ApiResult<()> {
    let presented = presented_token(headers).unwrap_or_default();

    if tokens_match(presented, expected) {
        return Ok(());
    }

    tracing::warn!(
        presented = %fingerprint(presented),
        expected = %fingerprint(expected),
        "Rejected request with invalid orchestrator token"
    );
    Err(ApiError::Unauthorized)
}
