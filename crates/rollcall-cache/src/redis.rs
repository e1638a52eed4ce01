//! Redis-backed key-value store.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, instrument};

use crate::config::CacheConfig;
use crate::store::{CacheError, Expiry, KeyValueStore};

/// Redis client with connection pooling.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    config: CacheConfig,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("key_prefix", &self.config.key_prefix)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connects to Redis using `config.redis_url`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if the connection cannot be established.
    pub async fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let client = Client::open(config.redis_url.as_str())?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl KeyValueStore for RedisCache {
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let key = self.config.prefixed_key(key);

        let value: Option<String> = conn.get(&key).await?;
        debug!(cache.key = %key, hit = value.is_some(), "Cache read");

        Ok(value)
    }

    #[instrument(skip(self, value), fields(cache.operation = "SET"))]
    async fn set(&self, key: &str, value: &str, expiry: Expiry) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let key = self.config.prefixed_key(key);

        match expiry {
            Expiry::After(ttl) => {
                conn.set_ex::<_, _, ()>(&key, value, ttl.as_secs().max(1))
                    .await?;
                debug!(cache.key = %key, cache.ttl_secs = %ttl.as_secs(), "Cache set");
            }
            Expiry::Keep => {
                let _: () = redis::cmd("SET")
                    .arg(&key)
                    .arg(value)
                    .arg("KEEPTTL")
                    .query_async(&mut conn)
                    .await?;
                debug!(cache.key = %key, "Cache set (ttl kept)");
            }
        }

        Ok(())
    }
}
