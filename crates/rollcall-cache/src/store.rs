//! The key-value contract shared by every cache backend.

use async_trait::async_trait;
use std::time::Duration;

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] ::redis::RedisError),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Expiry applied when writing a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Expire the key after the given duration.
    After(Duration),
    /// Keep whatever expiry the key already has.
    Keep,
}

/// Minimal string key-value store with per-key expiry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored at `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` at `key`.
    async fn set(&self, key: &str, value: &str, expiry: Expiry) -> Result<(), CacheError>;
}
