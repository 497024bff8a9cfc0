//! Argon2 password hashing for user accounts.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::{debug, error};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

pub trait PasswordUtils {
    /// Salted Argon2id hash in PHC string format
    fn hash_password(password: &str) -> Result<String, PasswordError>;

    /// `Ok(false)` on a wrong password, `Err` only when the hash itself is unusable
    fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError>;

    /// Every rule the password breaks, or `Ok` when it is acceptable
    fn validate_password_strength(password: &str) -> Result<(), Vec<String>>;
}

pub struct PasswordUtilsImpl;

impl PasswordUtils for PasswordUtilsImpl {
    fn hash_password(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| {
                error!("Failed to hash password: {}", err);
                PasswordError::HashingFailed(err.to_string())
            })
    }

    fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|err| {
            error!("Invalid password hash format: {}", err);
            PasswordError::InvalidHashFormat
        })?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password verification failed - wrong password");
                Ok(false)
            }
            Err(err) => {
                error!("Password verification error: {}", err);
                Err(PasswordError::VerificationFailed(err.to_string()))
            }
        }
    }

    fn validate_password_strength(password: &str) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(format!("Password must be at least {} characters long", MIN_PASSWORD_LEN));
        }
        if !password.chars().any(char::is_alphabetic) {
            errors.push("Password must contain at least one letter".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Password must contain at least one digit".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
