//! Chain middlewares and the values they exchange.
//!
//! Every exposed function runs behind an ordered list of middlewares. Each
//! middleware inspects the [`CallContext`](crate::dispatch::CallContext) and
//! the [`ResultBag`] filled by the middlewares before it, then returns a
//! [`Step`]:
//!
//! - [`Step::Advance`] records a value under the middleware's key and lets
//!   the chain continue
//! - [`Step::Terminate`] ends the call with an [`Outcome`]
//!
//! # Modules
//!
//! - [`auth`]: `__token`, `__tokenWithUser` and `__longToken`
//! - [`device`]: `__device`
//! - [`rate_limit`]: `__rateLimit`
//! - [`role`]: `__superadmin` and `__schoolAdmin`
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::{MiddlewareKey, MiddlewareSet};
//!
//! let middlewares = MiddlewareSet::standard(&tokens, &rate_limit, &collaborators);
//! assert!(middlewares.get(MiddlewareKey::Token).is_some());
//! ```

pub mod auth;
pub mod device;
pub mod rate_limit;
pub mod role;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use rollcall_auth::{TokenClaims, TokenService};
use rollcall_config::RateLimitConfig;
use rollcall_core::{Outcome, PendingResponse};

use crate::dispatch::CallContext;
use crate::state::Collaborators;

use self::auth::{LongTokenMiddleware, TokenMiddleware};
use self::device::DeviceMiddleware;
use self::rate_limit::RateLimitMiddleware;
use self::role::{SchoolAdminGate, SuperadminGate};

/// Identity of a middleware, also the key its value is recorded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MiddlewareKey {
    RateLimit,
    Device,
    LongToken,
    Token,
    TokenWithUser,
    Superadmin,
    SchoolAdmin,
}

impl MiddlewareKey {
    pub const ALL: [MiddlewareKey; 7] = [
        MiddlewareKey::RateLimit,
        MiddlewareKey::Device,
        MiddlewareKey::LongToken,
        MiddlewareKey::Token,
        MiddlewareKey::TokenWithUser,
        MiddlewareKey::Superadmin,
        MiddlewareKey::SchoolAdmin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MiddlewareKey::RateLimit => "__rateLimit",
            MiddlewareKey::Device => "__device",
            MiddlewareKey::LongToken => "__longToken",
            MiddlewareKey::Token => "__token",
            MiddlewareKey::TokenWithUser => "__tokenWithUser",
            MiddlewareKey::Superadmin => "__superadmin",
            MiddlewareKey::SchoolAdmin => "__schoolAdmin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

impl fmt::Display for MiddlewareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a middleware decided for the current call.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Continue with the next middleware, recording this value.
    Advance(Value),
    /// Stop the chain and respond with this outcome.
    Terminate(Outcome),
}

impl Step {
    pub fn terminate(outcome: impl Into<Outcome>) -> Self {
        Step::Terminate(outcome.into())
    }
}

/// Values produced by the middlewares of one call, keyed by middleware.
///
/// Entries are only ever added. A bag lives for exactly one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBag {
    entries: BTreeMap<MiddlewareKey, Value>,
}

impl ResultBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, key: MiddlewareKey, value: Value) {
        self.entries.entry(key).or_insert(value);
    }

    pub fn get(&self, key: MiddlewareKey) -> Option<&Value> {
        self.entries.get(&key)
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: MiddlewareKey) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// The recorded short-token value, from `__token` or else `__tokenWithUser`.
    pub fn token(&self) -> Option<&Value> {
        self.get(MiddlewareKey::Token)
            .or_else(|| self.get(MiddlewareKey::TokenWithUser))
    }

    /// The recorded short-token claims, if any.
    pub fn claims(&self) -> Option<TokenClaims> {
        self.token()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlays every recorded value onto `input` under its key.
    ///
    /// Recorded values win over client-supplied fields of the same name.
    pub fn merge_into(&self, mut input: Map<String, Value>) -> Map<String, Value> {
        for (key, value) in &self.entries {
            input.insert(key.as_str().to_string(), value.clone());
        }
        input
    }
}

/// A single step of a call's middleware chain.
///
/// Returning `Err` is reserved for unexpected failures; the chain ends with
/// an internal error in that case. Expected rejections are
/// [`Step::Terminate`].
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn run(
        &self,
        call: &CallContext,
        bag: &ResultBag,
        response: &mut PendingResponse,
    ) -> anyhow::Result<Step>;
}

/// The middlewares available to exposed functions, by key.
#[derive(Clone, Default)]
pub struct MiddlewareSet {
    middlewares: HashMap<MiddlewareKey, Arc<dyn Middleware>>,
}

impl fmt::Debug for MiddlewareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.middlewares.keys().map(MiddlewareKey::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("MiddlewareSet").field("keys", &keys).finish()
    }
}

impl MiddlewareSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: MiddlewareKey, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.insert(key, Arc::new(middleware));
        self
    }

    pub fn get(&self, key: MiddlewareKey) -> Option<Arc<dyn Middleware>> {
        self.middlewares.get(&key).cloned()
    }

    /// Every middleware the service ships, wired to its collaborators.
    pub fn standard(
        tokens: &TokenService,
        rate_limit: &RateLimitConfig,
        collaborators: &Collaborators,
    ) -> Self {
        Self::new()
            .with(
                MiddlewareKey::RateLimit,
                RateLimitMiddleware::new(collaborators.cache.clone(), rate_limit.clone()),
            )
            .with(MiddlewareKey::Device, DeviceMiddleware)
            .with(
                MiddlewareKey::LongToken,
                LongTokenMiddleware::new(tokens.clone()),
            )
            .with(
                MiddlewareKey::Token,
                TokenMiddleware::new(tokens.clone(), collaborators.directory.clone()),
            )
            .with(
                MiddlewareKey::TokenWithUser,
                TokenMiddleware::with_required_user(
                    tokens.clone(),
                    collaborators.directory.clone(),
                ),
            )
            .with(MiddlewareKey::Superadmin, SuperadminGate)
            .with(MiddlewareKey::SchoolAdmin, SchoolAdminGate)
    }
}
