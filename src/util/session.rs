//! Login sessions. A session id is minted at login, embedded in the token as
//! `jti`, and must still be present here for the token to be accepted.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::util::redis::{RedisError, RedisService};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session store error: {0}")]
    Store(String),
}

impl From<RedisError> for SessionError {
    fn from(err: RedisError) -> Self {
        SessionError::Store(err.to_string())
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores the session and returns its new id.
    async fn create(&self, session: Session, ttl_secs: u64) -> Result<String, SessionError>;
    async fn get(&self, session_id: &str) -> Result<Option<Session>, SessionError>;
    /// True if a live session was removed.
    async fn revoke(&self, session_id: &str) -> Result<bool, SessionError>;
}

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub struct RedisSessionStore {
    redis: RedisService,
    prefix: String,
}

impl RedisSessionStore {
    pub fn new(redis: RedisService, prefix: impl Into<String>) -> Self {
        RedisSessionStore { redis, prefix: prefix.into() }
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}{}", self.prefix, session_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, session: Session, ttl_secs: u64) -> Result<String, SessionError> {
        let id = new_session_id();
        self.redis.set_json_with_expiry(&self.key(&id), &session, ttl_secs).await?;
        info!(user_id = %session.user_id, "Session opened");
        Ok(id)
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>, SessionError> {
        Ok(self.redis.get_json(&self.key(session_id)).await?)
    }

    async fn revoke(&self, session_id: &str) -> Result<bool, SessionError> {
        Ok(self.redis.delete(&self.key(session_id)).await?)
    }
}

/// Process-local sessions for tests and single-node runs.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, (Session, DateTime<Utc>)>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: Session, ttl_secs: u64) -> Result<String, SessionError> {
        let id = new_session_id();
        let expires_at = Utc::now() + Duration::seconds(ttl_secs as i64);
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, (_, exp)| *exp > Utc::now());
        sessions.insert(id.clone(), (session, expires_at));
        debug!("In-memory session created ({} live)", sessions.len());
        Ok(id)
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .filter(|(_, exp)| *exp > Utc::now())
            .map(|(session, _)| session.clone()))
    }

    async fn revoke(&self, session_id: &str) -> Result<bool, SessionError> {
        Ok(self.sessions.write().await.remove(session_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: "65a000000000000000000001".to_string(),
            username: "sam".to_string(),
            role: "Fitter".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_get_revoke() {
        let store = InMemorySessionStore::new();
        let id = store.create(session(), 60).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().unwrap().username, "sam");
        assert!(store.revoke(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().is_none());
        assert!(!store.revoke(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_session_is_gone() {
        let store = InMemorySessionStore::new();
        let id = store.create(session(), 0).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_none());
    }
}
