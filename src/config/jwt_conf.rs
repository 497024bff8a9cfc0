use std::env;
use tracing::{debug, error, info};

use crate::config::{parse_env, required_env, ConfigError};

pub const MIN_SECRET_LEN: usize = 32;

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub jwt_secret: String,
    /// Session lifetime in minutes; bounds both the token and the stored session
    pub session_expiration: i64,
    pub jwt_issuer: Option<String>,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: at least 32 characters (required)
    /// - JWT_SESSION_EXPIRY: minutes, defaults to 480 (one working day)
    /// - JWT_ISSUER: optional
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let jwt_secret = required_env("JWT_SECRET")?;
        let session_expiration = parse_env::<i64>("JWT_SESSION_EXPIRY", "480")?;
        let jwt_issuer = env::var("JWT_ISSUER").ok();
        debug!(
            secret_len = jwt_secret.len(),
            session_expiration,
            issuer = jwt_issuer.as_deref().unwrap_or("<none>"),
            "JWT configuration"
        );

        let config = JwtConfig { jwt_secret, session_expiration, jwt_issuer };
        config.validate()?;
        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            error!("JWT secret is too short (minimum {} characters required)", MIN_SECRET_LEN);
            return Err(ConfigError::ValidationError(format!(
                "JWT secret must be at least {} characters long",
                MIN_SECRET_LEN
            )));
        }
        if self.session_expiration <= 0 {
            error!("Session expiration must be greater than 0");
            return Err(ConfigError::ValidationError("Session expiration must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn session_ttl_secs(&self) -> u64 {
        (self.session_expiration * 60) as u64
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough".to_string(),
            session_expiration: 480,
            jwt_issuer: Some("cabinetry-backend".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = JwtConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session_ttl_secs(), 480 * 60);
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = JwtConfig { jwt_secret: "short".to_string(), ..JwtConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let config = JwtConfig { session_expiration: 0, ..JwtConfig::default() };
        assert!(config.validate().is_err());
    }
}
