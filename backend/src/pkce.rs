//! Proof Key for Code Exchange (RFC 7636) helpers for the OAuth flow.

#[cfg(test)]
#[path = "pkce_test.rs"]
mod pkce_test;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// Fresh high-entropy verifier: 64 chars from the unreserved set.
#[must_use]
pub fn new_verifier() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
}

/// `S256` challenge for `verifier`.
#[must_use]
pub fn challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
