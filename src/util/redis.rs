use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::RedisConfig;

#[derive(Debug, thiserror::Error)]
pub enum RedisError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Operation error: {0}")]
    OperationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Thin JSON key/value wrapper over a multiplexed Redis connection.
#[derive(Clone)]
pub struct RedisService {
    connection_manager: ConnectionManager,
}

impl RedisService {
    #[instrument(skip(config), fields(host = %config.host, port = config.port, db = config.database))]
    pub async fn new(config: &RedisConfig) -> Result<Self, RedisError> {
        info!("Initializing Redis service");
        config.validate().map_err(|e| RedisError::ConfigError(e.to_string()))?;

        let client = Client::open(config.get_connection_url()).map_err(|e| {
            error!("Failed to create Redis client: {}", e);
            RedisError::ConnectionError(format!("Client creation failed: {}", e))
        })?;
        let connection_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to create Redis connection manager: {}", e);
            RedisError::ConnectionError(format!("Connection manager creation failed: {}", e))
        })?;

        let service = Self { connection_manager };
        service.ping().await?;
        info!("Redis service initialized successfully");
        Ok(service)
    }

    pub async fn ping(&self) -> Result<(), RedisError> {
        let mut conn = self.connection_manager.clone();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| RedisError::OperationError(format!("Ping failed: {}", e)))?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(RedisError::OperationError(format!("Unexpected ping response: {}", reply)))
        }
    }

    #[instrument(skip(self, value), fields(key = %key))]
    pub async fn set_json_with_expiry<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expiry_secs: u64,
    ) -> Result<(), RedisError> {
        let serialized =
            serde_json::to_string(value).map_err(|e| RedisError::SerializationError(e.to_string()))?;
        let mut conn = self.connection_manager.clone();
        conn.set_ex::<_, _, ()>(key, serialized, expiry_secs).await.map_err(|e| {
            error!("Failed to set key '{}': {}", key, e);
            RedisError::OperationError(format!("Set operation failed: {}", e))
        })?;
        debug!("Stored key '{}' for {} seconds", key, expiry_secs);
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RedisError> {
        let mut conn = self.connection_manager.clone();
        let raw: Option<String> = conn.get(key).await.map_err(|e| {
            error!("Failed to get key '{}': {}", key, e);
            RedisError::OperationError(format!("Get operation failed: {}", e))
        })?;
        raw.map(|data| {
            serde_json::from_str(&data).map_err(|e| RedisError::SerializationError(e.to_string()))
        })
        .transpose()
    }

    #[instrument(skip(self), fields(key = %key))]
    pub async fn delete(&self, key: &str) -> Result<bool, RedisError> {
        let mut conn = self.connection_manager.clone();
        let deleted: u64 = conn.del(key).await.map_err(|e| {
            error!("Failed to delete key '{}': {}", key, e);
            RedisError::OperationError(format!("Delete operation failed: {}", e))
        })?;
        Ok(deleted > 0)
    }
}
