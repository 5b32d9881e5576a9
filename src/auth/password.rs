//! Password hashing.
//!
//! The browser submits the plaintext over the form; the server folds it
//! with the username through SHA-256 first (so the stored Argon2 input
//! is uniform and never the raw password), then hashes with Argon2.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};

/// SHA-256 of password+username, hex encoded
pub fn digest(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(username.as_bytes());
    hex::encode(hasher.finalize())
}

/// Argon2 hash of a password digest, for storage
pub fn hash_password(password_digest: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password_digest.as_bytes(), &salt)?
        .to_string())
}

/// Verify a password digest against a stored Argon2 hash
pub fn verify_password(password_digest: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password_digest.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
