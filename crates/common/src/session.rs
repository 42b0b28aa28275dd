//! Redis-backed cookie sessions.
//!
//! Sessions are stored as JSON under a prefixed key with a sliding TTL:
//! each authenticated request extends the session's lifetime.

use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::{AppError, AppResult};

/// Data stored for an authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    /// Authenticated user ID.
    pub user_id: String,
    /// Authenticated user login.
    pub login: String,
    /// Whether the user is a moderator.
    pub is_moderator: bool,
}

/// Session store using Redis.
#[derive(Clone)]
pub struct SessionStore {
    redis: Arc<RedisClient>,
    prefix: String,
    ttl_secs: i64,
}

impl SessionStore {
    /// Create a new session store.
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: &str, ttl_secs: i64) -> Self {
        Self {
            redis,
            prefix: prefix.to_string(),
            ttl_secs,
        }
    }

    /// Session lifetime in seconds (also the cookie Max-Age).
    #[must_use]
    pub const fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    fn session_key(&self, session_id: &str) -> String {
        format!("{}:session:{session_id}", self.prefix)
    }

    /// Create a session.
    pub async fn create(&self, session_id: &str, data: &SessionData) -> AppResult<()> {
        let key = self.session_key(session_id);
        let json_str = serde_json::to_string(data)
            .map_err(|e| AppError::Internal(format!("Failed to serialize session: {e}")))?;

        self.redis
            .set::<(), _, _>(key, json_str, Some(Expiration::EX(self.ttl_secs)), None, false)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        debug!(user_id = %data.user_id, "Created session");
        Ok(())
    }

    /// Get a session by ID.
    ///
    /// Returns `Ok(None)` for unknown or expired sessions.
    pub async fn get(&self, session_id: &str) -> AppResult<Option<SessionData>> {
        let key = self.session_key(session_id);

        let result: Option<String> = self
            .redis
            .get(key)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        match result {
            Some(json_str) => {
                let data: SessionData = serde_json::from_str(&json_str)
                    .map_err(|e| AppError::Internal(format!("Corrupt session payload: {e}")))?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Extend a session's TTL (sliding expiration).
    pub async fn extend(&self, session_id: &str) -> AppResult<()> {
        let key = self.session_key(session_id);

        self.redis
            .expire::<(), _>(key, self.ttl_secs, None)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        Ok(())
    }

    /// Delete a session (logout).
    pub async fn delete(&self, session_id: &str) -> AppResult<()> {
        let key = self.session_key(session_id);

        self.redis
            .del::<(), _>(key)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        debug!(session_id = %session_id, "Deleted session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_is_prefixed() {
        let store = SessionStore {
            redis: Arc::new(RedisClient::default()),
            prefix: "hydromed".to_string(),
            ttl_secs: 60,
        };
        assert_eq!(store.session_key("abc123"), "hydromed:session:abc123");
    }

    #[test]
    fn test_session_data_round_trip() {
        let data = SessionData {
            user_id: "user1".to_string(),
            login: "alice".to_string(),
            is_moderator: false,
        };
        let json = serde_json::to_string(&data).unwrap();
        let back: SessionData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.user_id, "user1");
        assert_eq!(back.login, "alice");
        assert!(!back.is_moderator);
    }
}
