use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{required_env, ConfigError};

/// First administrator, created at startup when no user with this username exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl AdminUserConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading admin user configuration from environment variables");
        let config = AdminUserConfig {
            username: required_env("ADMIN_USERNAME")?,
            first_name: required_env("ADMIN_FIRST_NAME")?,
            last_name: required_env("ADMIN_LAST_NAME")?,
            email: required_env("ADMIN_EMAIL")?,
            password: required_env("ADMIN_PASSWORD")?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::ValidationError("ADMIN_USERNAME cannot be empty".to_string()));
        }
        if !self.email.contains('@') {
            return Err(ConfigError::ValidationError("ADMIN_EMAIL is not an email address".to_string()));
        }
        if self.password.len() < 8 {
            return Err(ConfigError::ValidationError("ADMIN_PASSWORD must be at least 8 characters".to_string()));
        }
        Ok(())
    }
}
