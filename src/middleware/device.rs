//! `__device`: client device metadata for short-token issuance.

use async_trait::async_trait;
use axum::http::header::USER_AGENT;
use serde_json::json;

use rollcall_core::PendingResponse;

use crate::dispatch::CallContext;
use crate::middleware::{Middleware, ResultBag, Step};

/// Advances with `{ip, agent}` describing the calling device. Never rejects.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeviceMiddleware;

#[async_trait]
impl Middleware for DeviceMiddleware {
    async fn run(
        &self,
        call: &CallContext,
        _bag: &ResultBag,
        _response: &mut PendingResponse,
    ) -> anyhow::Result<Step> {
        let agent = call.header(USER_AGENT.as_str()).unwrap_or_default();

        Ok(Step::Advance(json!({
            "ip": call.client,
            "agent": agent,
        })))
    }
}
