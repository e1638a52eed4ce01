//! `__rateLimit`: fixed-window request counter per client address.
//!
//! The counter lives in the shared key-value store under
//! `ratelimit:<address>` as `<count>:<window reset unix seconds>`. The key
//! expires with its window; later writes in the same window keep that
//! expiry.
//!
//! The limiter fails open: without a store, or when the store errors, the
//! call advances unthrottled.

use async_trait::async_trait;
use axum::http::HeaderValue;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

use rollcall_cache::{Expiry, KeyValueStore, keys};
use rollcall_config::RateLimitConfig;
use rollcall_core::{AppError, PendingResponse};

use crate::dispatch::CallContext;
use crate::metrics::track_rate_limited;
use crate::middleware::{Middleware, ResultBag, Step};

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

const TOO_MANY_REQUESTS: &str = "Too many requests. Please try again later.";

/// Counter state stored for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    count: u64,
    reset_at: i64,
}

impl Window {
    fn parse(raw: &str) -> Option<Self> {
        let (count, reset_at) = raw.split_once(':')?;
        Some(Self {
            count: count.parse().ok()?,
            reset_at: reset_at.parse().ok()?,
        })
    }

    fn encode(&self) -> String {
        format!("{}:{}", self.count, self.reset_at)
    }
}

#[derive(Clone)]
pub struct RateLimitMiddleware {
    cache: Option<Arc<dyn KeyValueStore>>,
    config: RateLimitConfig,
}

impl RateLimitMiddleware {
    pub fn new(cache: Option<Arc<dyn KeyValueStore>>, config: RateLimitConfig) -> Self {
        Self { cache, config }
    }

    async fn check(
        &self,
        cache: &dyn KeyValueStore,
        client: &str,
        response: &mut PendingResponse,
    ) -> anyhow::Result<Step> {
        let key = keys::rate_limit(client);
        let now = Utc::now().timestamp();

        let current = cache
            .get(&key)
            .await?
            .and_then(|raw| Window::parse(&raw))
            .filter(|window| window.reset_at > now);

        let window = current.unwrap_or(Window {
            count: 0,
            reset_at: now.saturating_add(self.config.window_seconds as i64),
        });

        let limit = self.config.max_requests;

        if window.count >= limit {
            debug!(client = %client, count = window.count, "Rate limit exceeded");
            track_rate_limited();
            self.set_headers(response, 0, window.reset_at)?;
            return Ok(Step::terminate(AppError::too_many_requests(
                TOO_MANY_REQUESTS,
            )));
        }

        let next = Window {
            count: window.count + 1,
            reset_at: window.reset_at,
        };
        let expiry = if window.count == 0 {
            Expiry::After(self.config.window())
        } else {
            Expiry::Keep
        };
        cache.set(&key, &next.encode(), expiry).await?;

        let remaining = limit.saturating_sub(next.count);
        self.set_headers(response, remaining, window.reset_at)?;

        Ok(Step::Advance(json!({
            "limit": limit,
            "remaining": remaining,
        })))
    }

    fn set_headers(
        &self,
        response: &mut PendingResponse,
        remaining: u64,
        reset_at: i64,
    ) -> anyhow::Result<()> {
        let reset = DateTime::<Utc>::from_timestamp(reset_at, 0)
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let headers = &mut response.headers;
        headers.insert(LIMIT_HEADER, HeaderValue::from(self.config.max_requests));
        headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
        headers.insert(RESET_HEADER, HeaderValue::from_str(&reset)?);

        Ok(())
    }
}

#[async_trait]
impl Middleware for RateLimitMiddleware {
    async fn run(
        &self,
        call: &CallContext,
        _bag: &ResultBag,
        response: &mut PendingResponse,
    ) -> anyhow::Result<Step> {
        let Some(cache) = &self.cache else {
            return Ok(Step::Advance(Value::Null));
        };

        match self.check(cache.as_ref(), &call.client, response).await {
            Ok(step) => Ok(step),
            Err(err) => {
                warn!(client = %call.client, error = %err, "Rate limit check failed, allowing request");
                Ok(Step::Advance(Value::Null))
            }
        }
    }
}
