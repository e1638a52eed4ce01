//! Token middlewares.
//!
//! Both token classes travel in the `token` request header. Verification
//! problems of any kind are reported as `401 unauthorized`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use rollcall_auth::{TokenClaims, TokenService};
use rollcall_core::{AppError, PendingResponse};
use rollcall_db::UserDirectory;

use crate::dispatch::CallContext;
use crate::middleware::{Middleware, ResultBag, Step};

/// Request header carrying long and short tokens.
pub const TOKEN_HEADER: &str = "token";

fn unauthorized(message: &str) -> Step {
    Step::terminate(AppError::unauthorized(message))
}

/// `__token` / `__tokenWithUser`: verifies a short token and hydrates the
/// caller's role and school from the user directory.
///
/// Hydration runs a fresh lookup on every call. Without a directory,
/// `__token` advances with the bare claims while `__tokenWithUser` rejects.
#[derive(Clone)]
pub struct TokenMiddleware {
    tokens: TokenService,
    directory: Option<Arc<dyn UserDirectory>>,
    require_user: bool,
}

impl TokenMiddleware {
    pub fn new(tokens: TokenService, directory: Option<Arc<dyn UserDirectory>>) -> Self {
        Self {
            tokens,
            directory,
            require_user: false,
        }
    }

    pub fn with_required_user(
        tokens: TokenService,
        directory: Option<Arc<dyn UserDirectory>>,
    ) -> Self {
        Self {
            tokens,
            directory,
            require_user: true,
        }
    }

    async fn hydrate(&self, claims: TokenClaims) -> Result<TokenClaims, Step> {
        let Some(directory) = &self.directory else {
            if self.require_user {
                warn!(user_id = %claims.user_id, "User lookup required but no user directory is configured");
                return Err(unauthorized("unauthorized"));
            }
            return Ok(claims);
        };

        match directory
            .find_active_user_role_and_tenant(&claims.user_id)
            .await
        {
            Ok(Some(authority)) => Ok(claims.hydrate(authority.role, authority.school_id)),
            Ok(None) => {
                debug!(user_id = %claims.user_id, "Token user not found or inactive");
                Err(unauthorized("user not found or inactive"))
            }
            Err(err) => {
                warn!(user_id = %claims.user_id, error = %err, "User lookup failed");
                Err(unauthorized("unauthorized"))
            }
        }
    }
}

#[async_trait]
impl Middleware for TokenMiddleware {
    async fn run(
        &self,
        call: &CallContext,
        _bag: &ResultBag,
        _response: &mut PendingResponse,
    ) -> anyhow::Result<Step> {
        let Some(token) = call.header(TOKEN_HEADER) else {
            debug!(module = %call.module, function = %call.function, "Token required but not found");
            return Ok(unauthorized("unauthorized"));
        };

        let Some(claims) = self.tokens.verify_short(token) else {
            return Ok(unauthorized("unauthorized"));
        };

        match self.hydrate(claims).await {
            Ok(claims) => Ok(Step::Advance(serde_json::to_value(claims)?)),
            Err(step) => Ok(step),
        }
    }
}

/// `__longToken`: verifies an account-level long token.
#[derive(Clone, Debug)]
pub struct LongTokenMiddleware {
    tokens: TokenService,
}

impl LongTokenMiddleware {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl Middleware for LongTokenMiddleware {
    async fn run(
        &self,
        call: &CallContext,
        _bag: &ResultBag,
        _response: &mut PendingResponse,
    ) -> anyhow::Result<Step> {
        let Some(claims) = call
            .header(TOKEN_HEADER)
            .and_then(|token| self.tokens.verify_long(token))
        else {
            return Ok(unauthorized("unauthorized"));
        };

        Ok(Step::Advance(serde_json::to_value(claims)?))
    }
}
