//! Role gates.
//!
//! Gates read the short-token claims recorded by `__token` (or
//! `__tokenWithUser`) and either forward the recorded value unchanged or
//! reject the call. They never modify the token.

use async_trait::async_trait;
use serde_json::Value;

use rollcall_auth::{Role, TokenClaims};
use rollcall_core::{AppError, PendingResponse};

use crate::dispatch::CallContext;
use crate::middleware::{Middleware, ResultBag, Step};

/// The recorded token value and its parsed claims.
fn authenticated(bag: &ResultBag) -> Result<(Value, TokenClaims), Step> {
    let token = bag
        .token()
        .ok_or_else(|| Step::terminate(AppError::unauthorized("authentication required")))?;

    let claims = serde_json::from_value(token.clone())
        .map_err(|_| Step::terminate(AppError::unauthorized("authentication required")))?;

    Ok((token.clone(), claims))
}

fn has_school(claims: &TokenClaims) -> bool {
    claims.school_id.as_ref().is_some_and(|id| !id.is_empty())
}

/// `__superadmin`: the caller's role must be exactly `superadmin`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SuperadminGate;

impl SuperadminGate {
    pub fn check(bag: &ResultBag) -> Step {
        let (token, claims) = match authenticated(bag) {
            Ok(found) => found,
            Err(step) => return step,
        };

        if claims.role != Some(Role::Superadmin) {
            return Step::terminate(AppError::forbidden("superadmin access required"));
        }

        Step::Advance(token)
    }
}

#[async_trait]
impl Middleware for SuperadminGate {
    async fn run(
        &self,
        _call: &CallContext,
        bag: &ResultBag,
        _response: &mut PendingResponse,
    ) -> anyhow::Result<Step> {
        Ok(Self::check(bag))
    }
}

/// `__schoolAdmin`: the caller must be a school admin assigned to a school,
/// or a superadmin.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchoolAdminGate;

impl SchoolAdminGate {
    pub fn check(bag: &ResultBag) -> Step {
        let (token, claims) = match authenticated(bag) {
            Ok(found) => found,
            Err(step) => return step,
        };

        match claims.role {
            Some(Role::Superadmin) => Step::Advance(token),
            Some(Role::SchoolAdmin) if has_school(&claims) => Step::Advance(token),
            Some(Role::SchoolAdmin) => Step::terminate(AppError::forbidden(
                "school administrator must be assigned to a school",
            )),
            _ => Step::terminate(AppError::forbidden("school administrator access required")),
        }
    }
}

#[async_trait]
impl Middleware for SchoolAdminGate {
    async fn run(
        &self,
        _call: &CallContext,
        bag: &ResultBag,
        _response: &mut PendingResponse,
    ) -> anyhow::Result<Step> {
        Ok(Self::check(bag))
    }
}
