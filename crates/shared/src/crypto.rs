//! Hashing helpers for session token identifiers.

use sha2::{Digest, Sha256};

/// Computes SHA-256 of the input and returns it as lowercase hex.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash stored in `user_sessions` for a token's `jti`.
///
/// Raw identifiers never reach the database, so a leaked session table
/// cannot be replayed against the token validator.
pub fn session_token_hash(jti: &str) -> String {
    sha256_hex(jti)
}
