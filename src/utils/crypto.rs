use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

/// Hashes a password with argon2 on the blocking pool.
pub async fn hash_password(plain: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))
    })
    .await
    .map_err(|e| Error::Internal(format!("password hashing task failed: {}", e)))?
}

/// Checks `plain` against a stored PHC string. A malformed stored hash is an
/// internal error, not a mismatch.
pub async fn verify_password(plain: String, hashed: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&hashed)
            .map_err(|e| Error::Internal(format!("stored password hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed_hash)
            .is_ok())
    })
    .await
    .map_err(|e| Error::Internal(format!("password verification task failed: {}", e)))?
}

pub fn secrets_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
