// Password hashing and verification

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id, returning a PHC string
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }

    /// Verify a password against a stored PHC string
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = PasswordService::hash_password("Passwordlong12(").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(PasswordService::verify_password("Passwordlong12(", &hash).unwrap());
        assert!(!PasswordService::verify_password("Passwordlong12)", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = PasswordService::hash_password("Passwordlong12(").unwrap();
        let second = PasswordService::hash_password("Passwordlong12(").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_corrupt_hash_is_an_error() {
        assert!(matches!(
            PasswordService::verify_password("whatever", "not-a-phc-string"),
            Err(AuthError::PasswordHash(_))
        ));
    }
}
