use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;
use tracing::warn;

use crate::shared::AppError;

const SALT_LEN: usize = 16;

// Stand-in hash for logins against an unknown email, generated on first use
static DECOY_HASH: OnceLock<String> = OnceLock::new();

/// Hashes a password with argon2id and a fresh random salt.
/// The salt and parameters are embedded in the returned PHC string.
pub fn hash_password(plaintext: &str) -> Result<String, AppError> {
    let salt_bytes: [u8; SALT_LEN] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::PasswordHash(e.to_string()))?;

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(e.to_string()))
}

/// Checks a candidate password against a stored PHC hash.
/// An unreadable stored hash counts as a mismatch.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "Stored password hash could not be parsed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

/// Runs a full argon2 verification for an email with no account and
/// always reports a mismatch, so both login failures cost the same.
pub fn verify_unknown_account(candidate: &str) -> bool {
    let decoy = DECOY_HASH.get_or_init(|| {
        hash_password("unknown-account-decoy").unwrap_or_else(|e| {
            warn!(error = %e, "Could not build decoy password hash");
            String::new()
        })
    });
    verify_password(candidate, decoy);
    false
}
