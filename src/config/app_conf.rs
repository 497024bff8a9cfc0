use std::str::FromStr;

use tracing::{debug, info};

use crate::config::{env_or, parse_env, ConfigError};

/// Where entities are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::InvalidValue(format!("STORE_BACKEND: {}", other))),
        }
    }
}

/// Where login sessions live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Redis,
    Memory,
}

impl FromStr for SessionBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(SessionBackend::Redis),
            "memory" => Ok(SessionBackend::Memory),
            other => Err(ConfigError::InvalidValue(format!("SESSION_BACKEND: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub session_backend: SessionBackend,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading application configuration from environment variables");
        let host = env_or("APP_HOST", "127.0.0.1");
        let port = parse_env::<u16>("APP_PORT", "8080")?;
        let store_backend = env_or("STORE_BACKEND", "mongo").parse()?;
        let session_backend = env_or("SESSION_BACKEND", "redis").parse()?;
        debug!(%host, port, ?store_backend, ?session_backend, "Application configuration");
        let config = AppConfig { host, port, store_backend, session_backend };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::ValidationError("APP_HOST cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            session_backend: SessionBackend::Memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("Mongo".parse::<StoreBackend>().unwrap(), StoreBackend::Mongo);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("postgres".parse::<StoreBackend>().is_err());
        assert_eq!("REDIS".parse::<SessionBackend>().unwrap(), SessionBackend::Redis);
        assert!("file".parse::<SessionBackend>().is_err());
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }
}
