//! # Rollcall API
//!
//! An HTTP service that routes every call through a single entry point,
//! `/api/{module}/{function}`, to functions exposed by registered modules.
//! Each exposed function declares the middlewares ("bolts") that must run
//! before it; their results accumulate in a shared bag the handler can read.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── dispatch/         # Registry, dispatcher and the middleware chain runner
//! ├── middleware/       # Rate limit, device, token and role middlewares
//! ├── modules/          # Exposed modules
//! │   ├── token/       # Short token issuance
//! │   ├── identity/    # Token and tenant introspection
//! │   └── system/      # Catalog of exposed functions
//! ├── router.rs         # HTTP entry point, health and API docs
//! └── state.rs          # Startup wiring
//! ```
//!
//! Workspace crates:
//!
//! - [`rollcall_core`]: the response envelope and `AppError`
//! - [`rollcall_config`]: environment configuration
//! - [`rollcall_auth`]: long and short tokens, roles and device fingerprints
//! - [`rollcall_cache`]: the key-value store behind rate limiting
//! - [`rollcall_db`]: the user directory used to hydrate tokens
//!
//! ## Authentication
//!
//! - **Long token**: issued once per account, signed with `LONG_TOKEN_SECRET`
//! - **Short token**: exchanged for a long token on `token/v1_createShortToken`,
//!   bound to a session and a device fingerprint, signed with `SHORT_TOKEN_SECRET`
//!
//! Both travel in the `token` request header.
//!
//! ## Response envelope
//!
//! Every response has the same shape:
//!
//! ```json
//! { "ok": true, "data": {}, "errors": [], "message": "" }
//! ```
//!
//! ## API Documentation
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`

pub mod dispatch;
pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;

// Re-export workspace crates for convenience
pub use rollcall_auth;
pub use rollcall_cache;
pub use rollcall_config;
pub use rollcall_core;
pub use rollcall_db;
