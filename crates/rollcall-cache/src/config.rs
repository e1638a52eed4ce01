//! Redis cache configuration.

use std::env;

/// Redis cache configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `REDIS_URL`: Redis connection URL (default: `redis://127.0.0.1:6379`)
/// - `CACHE_PREFIX`: Prefix for all cache keys (default: `rollcall`)
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Redis connection URL.
    pub redis_url: String,

    /// Prefix for all cache keys to avoid collisions.
    pub key_prefix: String,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into()),
            key_prefix: env::var("CACHE_PREFIX").unwrap_or_else(|_| "rollcall".into()),
        }
    }

    /// Build a prefixed cache key.
    ///
    /// An empty prefix leaves the key untouched.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = CacheConfig::default();
    /// let key = config.prefixed_key("ratelimit:10.0.0.1");
    /// // Returns "rollcall:ratelimit:10.0.0.1"
    /// ```
    pub fn prefixed_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.key_prefix, key)
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".into(),
            key_prefix: "rollcall".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_key() {
        let config = CacheConfig::default();
        assert_eq!(
            config.prefixed_key("ratelimit:10.0.0.1"),
            "rollcall:ratelimit:10.0.0.1"
        );
    }

    #[test]
    fn test_empty_prefix() {
        let config = CacheConfig {
            key_prefix: String::new(),
            ..CacheConfig::default()
        };
        assert_eq!(config.prefixed_key("k"), "k");
    }
}
