use serde_json::Value;
use tracing::instrument;

use crate::dispatch::{HandlerError, HandlerInput, to_payload};
use crate::modules::identity::model::TenantResponse;

/// The verified and hydrated claims of the caller.
#[instrument(skip(input))]
pub async fn whoami(input: HandlerInput) -> Result<Value, HandlerError> {
    input
        .results()
        .token()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("token claims missing").into())
}

/// The role and school of a school administrator (or superadmin).
#[instrument(skip(input))]
pub async fn tenant(input: HandlerInput) -> Result<Value, HandlerError> {
    let claims = input
        .claims()
        .ok_or_else(|| anyhow::anyhow!("token claims missing"))?;

    to_payload(&TenantResponse {
        role: claims.role.map(String::from),
        school_id: claims.school_id,
    })
}
