//! Argon2id password hashing in PHC string format

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::AuthError;

/// Hash a password with a fresh random salt
///
/// # Errors
///
/// Returns `AuthError::Hashing` if Argon2 rejects the input
pub fn hash(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check a password against a stored PHC hash
///
/// # Errors
///
/// Returns `AuthError::Hashing` if the stored hash cannot be parsed
pub fn verify(password: &str, stored: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Validate that `stored` is a well-formed PHC string
///
/// # Errors
///
/// Returns `AuthError::Hashing` describing the parse failure
pub fn check_format(stored: &str) -> Result<(), AuthError> {
    PasswordHash::new(stored)
        .map(|_| ())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let stored = hash("correct horse").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify("correct horse", &stored).unwrap());
        assert!(!verify("battery staple", &stored).unwrap());
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash("same").unwrap(), hash("same").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(verify("pw", "not-a-phc-string"), Err(AuthError::Hashing(_))));
        assert!(check_format("plaintext-password").is_err());
    }
}
