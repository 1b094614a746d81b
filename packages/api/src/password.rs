//! Password hashing.
//!
//! Hashing runs on the blocking pool; argon2 is deliberately slow.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{ApiError, ApiResult};

/// Hash a password into a PHC string.
pub async fn hash_password(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await
    .map_err(|e| ApiError::internal(format!("Password hashing task failed: {}", e)))?
    .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string.
///
/// An unparsable stored hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || match PasswordHash::new(&hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            false
        }
    })
    .await
    .map_err(|e| ApiError::internal(format!("Password check task failed: {}", e)))
}
