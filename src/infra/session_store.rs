//! Server-side session persistence.
//!
//! Sessions are JSON blobs keyed by the cookie id. Redis is used when
//! configured, otherwise a process-local map.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

use crate::config::{Config, CACHE_PREFIX_SESSION};
use crate::domain::Session;
use crate::errors::{AppError, AppResult};

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session by id; expired or unknown ids yield `None`.
    async fn load(&self, session_id: &str) -> AppResult<Option<Session>>;

    /// Persist the session, refreshing its retention.
    async fn save(&self, session: &Session) -> AppResult<()>;

    async fn delete(&self, session_id: &str) -> AppResult<()>;
}

/// Pick the store for this configuration.
pub async fn connect_session_store(config: &Config) -> AppResult<Arc<dyn SessionStore>> {
    match &config.redis_url {
        Some(url) => {
            let store = RedisSessionStore::connect(url, config.session_ttl_seconds)
                .await
                .map_err(|e| AppError::Config(format!("Redis connection failed: {}", e)))?;
            tracing::info!("Redis session store connected");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("REDIS_URL not set, keeping sessions in memory");
            Ok(Arc::new(MemorySessionStore::new(config.session_ttl_seconds)))
        }
    }
}

fn session_key(session_id: &str) -> String {
    format!("{}{}", CACHE_PREFIX_SESSION, session_id)
}

// =============================================================================
// Redis
// =============================================================================

/// Redis-backed store with connection pooling.
#[derive(Clone)]
pub struct RedisSessionStore {
    connection: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            connection,
            ttl_seconds,
        })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: &str) -> AppResult<Option<Session>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn
            .get(session_key(session_id))
            .await
            .map_err(store_error)?;

        match value {
            Some(json) => {
                let parsed = serde_json::from_str(&json).map_err(|e| {
                    AppError::internal(format!("Session deserialization error: {}", e))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, session: &Session) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(session)
            .map_err(|e| AppError::internal(format!("Session serialization error: {}", e)))?;

        conn.set_ex::<_, _, ()>(session_key(session.id()), json, self.ttl_seconds)
            .await
            .map_err(store_error)?;

        Ok(())
    }

    async fn delete(&self, session_id: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(session_key(session_id)).await.map_err(store_error)?;
        Ok(())
    }
}

fn store_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Session store error: {}", e))
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-local store. Sessions vanish on restart.
#[derive(Clone)]
pub struct MemorySessionStore {
    entries: Arc<RwLock<HashMap<String, (Session, Instant)>>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> AppResult<Option<Session>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(session_id)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(session, _)| session.clone()))
    }

    async fn save(&self, session: &Session) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(session.id().to_string(), (session.clone(), now + self.ttl));
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> AppResult<()> {
        self.entries.write().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_prefix() {
        assert_eq!(session_key("abc"), "session:abc");
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new(60);
        let mut session = Session::new();
        session.insert("selected_case_id", 4);

        store.save(&session).await.unwrap();
        assert_eq!(store.load(session.id()).await.unwrap(), Some(session.clone()));

        store.delete(session.id()).await.unwrap();
        assert!(store.load(session.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_expires_sessions() {
        let store = MemorySessionStore::new(0);
        let session = Session::new();

        store.save(&session).await.unwrap();
        assert!(store.load(session.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_session_is_none() {
        let store = MemorySessionStore::new(60);
        assert!(store.load("missing").await.unwrap().is_none());
    }
}
