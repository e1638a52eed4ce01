//! # Rollcall Core
//!
//! Foundational types shared by every Rollcall crate.
//!
//! - [`errors`]: [`AppError`], an HTTP status paired with an [`anyhow::Error`]
//! - [`envelope`]: the [`Outcome`] produced by middlewares and handlers, the
//!   normalized [`ResponseEnvelope`] sent on the wire, and [`dispatch`], the
//!   single place where an outcome becomes an HTTP response
//!
//! # Example
//!
//! ```ignore
//! use rollcall_core::{Outcome, PendingResponse, dispatch};
//! use serde_json::json;
//!
//! let response = dispatch(PendingResponse::default(), Outcome::success(json!({ "id": 1 })));
//! assert_eq!(response.status(), 200);
//! ```

pub mod envelope;
pub mod errors;

pub use envelope::{Outcome, PendingResponse, ResponseEnvelope, dispatch};
pub use errors::AppError;
