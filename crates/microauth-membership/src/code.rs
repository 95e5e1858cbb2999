//! One-time invite codes.
//!
//! Codes are short and human-typeable, drawn uniformly from uppercase
//! ASCII letters and digits. Only the SHA-256 digest is persisted.

use rand::Rng;
use sha2::{Digest, Sha256};

/// The 36-symbol code alphabet.
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a code of `length` symbols from the thread-local CSPRNG.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// SHA-256 of a code, hex-encoded. This is the value stored in
/// `member_invite.code_hash`.
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}
