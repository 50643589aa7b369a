//! Credential hashing.
//!
//! New passwords are stored as salted Argon2id PHC strings. Records written by
//! the previous system hold an unsalted hex SHA-256 digest; those still verify
//! and are reported as [`Verification::LegacyMatch`] so callers can upgrade them.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use thiserror::Error;

const SALT_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to generate salt: {0}")]
    Salt(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Outcome of comparing a submitted password with a stored hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Match,
    /// Matched an unsalted legacy digest; the caller should re-hash
    LegacyMatch,
    Mismatch,
}

impl Verification {
    pub fn is_match(&self) -> bool {
        !matches!(self, Verification::Mismatch)
    }
}

/// Hash a password for storage with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt = [0u8; SALT_BYTES];
    getrandom::getrandom(&mut salt).map_err(|e| PasswordError::Salt(e.to_string()))?;
    hash_password_with_salt(password, &salt)
}

/// Deterministic for a fixed salt
pub fn hash_password_with_salt(password: &str, salt: &[u8]) -> Result<String, PasswordError> {
    let salt = SaltString::encode_b64(salt).map_err(|e| PasswordError::Salt(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Unsalted SHA-256 hex digest used by the previous system
pub fn legacy_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

fn is_legacy_digest(stored: &str) -> bool {
    stored.len() == 64 && stored.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Recompute the hash of `password` with the parameters in `stored` and compare
pub fn verify_password(password: &str, stored: &str) -> Verification {
    if let Ok(parsed) = PasswordHash::new(stored) {
        return match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Verification::Match,
            Err(_) => Verification::Mismatch,
        };
    }

    if is_legacy_digest(stored) && constant_time_eq(legacy_digest(password).as_bytes(), stored.as_bytes()) {
        return Verification::LegacyMatch;
    }

    Verification::Mismatch
}

/// Argon2 hash of a throwaway password, computed once
fn dummy_hash() -> Option<&'static str> {
    static HASH: OnceLock<Option<String>> = OnceLock::new();
    HASH.get_or_init(|| hash_password_with_salt("unregistered-account", b"matrix-pms-dummy").ok())
        .as_deref()
}

/// Run a full Argon2 verify and discard the result. Lookups for unknown
/// accounts call this so they cost the same as a wrong password.
pub fn verify_dummy(password: &str) {
    if let Some(hash) = dummy_hash() {
        verify_password(password, hash);
    }
}
