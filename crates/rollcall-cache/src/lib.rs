//! # Rollcall Cache
//!
//! The shared key-value collaborator used by the rate limiter.
//!
//! This crate provides:
//! - [`KeyValueStore`], the narrow `get` / `set` contract the service relies on
//! - [`RedisCache`], the production store backed by a Redis connection manager
//! - [`MemoryStore`], an in-process store for tests and single-node setups
//! - cache configuration from environment variables and key builders
//!
//! # Example
//!
//! ```ignore
//! use rollcall_cache::{CacheConfig, Expiry, KeyValueStore, RedisCache, keys};
//! use std::time::Duration;
//!
//! let config = CacheConfig::from_env();
//! let cache = RedisCache::new(&config).await?;
//!
//! let key = keys::rate_limit("10.0.0.1");
//! cache.set(&key, "1", Expiry::After(Duration::from_secs(900))).await?;
//! let count = cache.get(&key).await?;
//! ```

pub mod config;
pub mod keys;
pub mod memory;
pub mod redis;
pub mod store;

pub use config::CacheConfig;
pub use memory::MemoryStore;
pub use redis::RedisCache;
pub use store::{CacheError, Expiry, KeyValueStore};
