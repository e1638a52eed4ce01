//! Request dispatch.
//!
//! Incoming calls name a module and a function. The [`Dispatcher`] resolves
//! them against the startup-built [`Registry`], runs the entry's middleware
//! chain through a [`Bolt`], invokes the handler and hands the outcome to
//! the response dispatcher.
//!
//! ```text
//! /api/{module}/{function}
//!     → Dispatcher::handle   resolve module, verb and function
//!     → Bolt::run            middlewares in order, then the handler
//!     → rollcall_core::dispatch
//! ```

pub mod bolt;
pub mod dispatcher;
pub mod registry;

use axum::http::{HeaderMap, Method};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

pub use bolt::Bolt;
pub use dispatcher::{Dispatcher, Transport};
pub use registry::{
    ExposedDescription, Handler, HandlerError, HandlerInput, ModuleDescriptor, Registry,
    RegistryBuilder, RegistryError, to_payload,
};

/// HTTP verbs an exposed function may be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Delete => "delete",
        }
    }

    /// Parses a lowercase or uppercase verb name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "get" => Some(Verb::Get),
            "post" => Some(Verb::Post),
            "put" => Some(Verb::Put),
            "delete" => Some(Verb::Delete),
            _ => None,
        }
    }

    pub fn from_method(method: &Method) -> Option<Self> {
        Self::parse(method.as_str())
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything known about one resolved call.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub verb: Verb,
    pub module: String,
    pub function: String,
    /// Request body fields merged over query parameters
    pub input: Map<String, Value>,
    pub headers: HeaderMap,
    /// Client network address
    pub client: String,
}

impl CallContext {
    /// A request header as text, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}
