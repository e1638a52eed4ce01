//! # Rollcall Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`token`]: signing secrets and lifetimes for long and short tokens
//! - [`rate_limit`]: fixed-window request quota per client
//! - [`cors`]: allowed CORS origins
//! - [`server`]: listener address
//!
//! # Example
//!
//! ```ignore
//! use rollcall_config::{CorsConfig, RateLimitConfig, TokenConfig};
//!
//! let token_config = TokenConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! ```

pub mod cors;
pub mod rate_limit;
pub mod server;
pub mod token;

pub use cors::CorsConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
pub use token::TokenConfig;
