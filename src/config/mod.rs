pub mod admin_user_conf;
pub mod app_conf;
pub mod jwt_conf;
pub mod mongo_conf;
pub mod redis_conf;

pub use admin_user_conf::AdminUserConfig;
pub use app_conf::{AppConfig, SessionBackend, StoreBackend};
pub use jwt_conf::JwtConfig;
pub use mongo_conf::MongoConfig;
pub use redis_conf::RedisConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Reads `name`, falling back to `default` with a warning when unset.
pub(crate) fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| {
        tracing::warn!("{} not set, using default: {}", name, default);
        default.to_string()
    })
}

pub(crate) fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| {
        tracing::error!("{} environment variable not found", name);
        ConfigError::EnvVarNotFound(name.to_string())
    })
}

pub(crate) fn parse_env<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_or(name, default).parse::<T>().map_err(|e| {
        tracing::error!("Invalid {} value: {}", name, e);
        ConfigError::ParseError(format!("{}: {}", name, e))
    })
}
