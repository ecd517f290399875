//! Opaque credential generation for refresh and password-reset tokens.
//!
//! Raw values go to the client; only SHA-256 hashes touch storage, so a
//! database leak does not leak usable credentials.

use base64::prelude::*;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a cryptographically random opaque token
/// (32 bytes, base64url-encoded without padding).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hash of a raw token, hex-encoded. This is the stored lookup key.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
