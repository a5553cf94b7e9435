//! Password hashing and verification with bcrypt.
//!
//! The authentication core treats credential checking as a collaborator:
//! login calls [`verify_password`], user creation calls [`hash_password`].
//! Plaintext passwords are never stored.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Hash a password for storage.
///
/// Length limits only: the lower bound keeps trivial secrets out, the
/// upper bound is a bcrypt input limitation.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        )));
    }

    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a password against its stored hash.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    verify(password, hashed)
        .map_err(|e| AppError::Internal(format!("password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_one_way() {
        let hashed = hash_password("correct horse").expect("failed to hash");

        assert_ne!(hashed, "correct horse");
        assert!(hashed.starts_with("$2"));
    }

    #[test]
    fn matching_password_verifies() {
        let hashed = hash_password("correct horse").expect("failed to hash");
        assert!(verify_password("correct horse", &hashed).expect("failed to verify"));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hashed = hash_password("correct horse").expect("failed to hash");
        assert!(!verify_password("wrong horse!", &hashed).expect("failed to verify"));
    }

    #[test]
    fn too_short_password_is_rejected() {
        assert!(hash_password("short").is_err());
    }

    #[test]
    fn too_long_password_is_rejected() {
        let long = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(hash_password(&long).is_err());
    }
}
