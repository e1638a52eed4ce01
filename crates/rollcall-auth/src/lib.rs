//! # Rollcall Auth
//!
//! Stateless credentials for the Rollcall API.
//!
//! - [`claims`]: the claims carried by signed tokens and their hydrated form
//! - [`roles`]: authority roles looked up for a user after verification
//! - [`jwt`]: the [`TokenService`] that issues and verifies tokens
//! - [`device`]: session identifiers and device fingerprints
//!
//! # Token Classes
//!
//! - **Long token**: account-scoped credential, valid for 3 years by default,
//!   signed with `LONG_TOKEN_SECRET`
//! - **Short token**: bound to a session and a device, valid for 1 year by
//!   default, signed with `SHORT_TOKEN_SECRET`
//!
//! Tokens never carry authority. Role and school assignment are looked up
//! after verification so a stale token cannot hold stale privileges.
//!
//! # Example
//!
//! ```ignore
//! use rollcall_auth::TokenService;
//! use rollcall_config::TokenConfig;
//!
//! let tokens = TokenService::new(TokenConfig::from_env());
//! let long = tokens.issue_long_token("u1", "k1")?;
//! let claims = tokens.verify_long(&long).expect("freshly issued");
//! assert_eq!(claims.user_id, "u1");
//! ```

pub mod claims;
pub mod device;
pub mod jwt;
pub mod roles;

pub use claims::TokenClaims;
pub use device::{device_fingerprint, new_session_id};
pub use jwt::TokenService;
pub use roles::Role;
