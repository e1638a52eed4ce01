use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, instrument};

use rollcall_auth::{TokenClaims, TokenService, device_fingerprint, new_session_id};

use crate::dispatch::{Handler, HandlerError, HandlerInput, to_payload};
use crate::metrics::track_short_token_issued;
use crate::middleware::MiddlewareKey;
use crate::modules::token::model::ShortTokenResponse;

/// Exchanges a long token for a short token bound to a fresh session and
/// the calling device.
#[derive(Clone, Debug)]
pub struct CreateShortToken {
    tokens: TokenService,
}

impl CreateShortToken {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl Handler for CreateShortToken {
    #[instrument(skip(self, input))]
    async fn call(&self, input: HandlerInput) -> Result<Value, HandlerError> {
        let claims: TokenClaims = input
            .results()
            .get_as(MiddlewareKey::LongToken)
            .ok_or_else(|| anyhow::anyhow!("long token claims missing"))?;

        let device = input
            .results()
            .get(MiddlewareKey::Device)
            .cloned()
            .unwrap_or_else(|| json!({}));

        let session_id = new_session_id();
        let device_id = device_fingerprint(&device);

        let short_token = self
            .tokens
            .issue_short_token(&claims.user_id, &claims.user_key, &session_id, &device_id)
            .map_err(|e| HandlerError::Failed(e.error))?;

        track_short_token_issued();
        info!(user_id = %claims.user_id, session_id = %session_id, "Short token issued");

        to_payload(&ShortTokenResponse { short_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_config::TokenConfig;
    use serde_json::Map;

    use crate::middleware::ResultBag;

    fn tokens() -> TokenService {
        TokenService::new(TokenConfig {
            long_token_secret: "long-secret-key-at-least-32-characters-long".to_string(),
            short_token_secret: "short-secret-key-at-least-32-characters-long".to_string(),
            long_token_expiry: 3600,
            short_token_expiry: 3600,
        })
    }

    fn input_for(service: &TokenService, device: Value) -> HandlerInput {
        let long = service.issue_long_token("u1", "k1").unwrap();
        let claims = service.verify_long(&long).unwrap();

        let mut results = ResultBag::new();
        results.record(MiddlewareKey::LongToken, serde_json::to_value(claims).unwrap());
        results.record(MiddlewareKey::Device, device);
        HandlerInput::new(Map::new(), results)
    }

    #[tokio::test]
    async fn test_issues_device_bound_short_token() {
        let service = tokens();
        let device = json!({ "ip": "10.0.0.1", "agent": "curl/8.0" });
        let handler = CreateShortToken::new(service.clone());

        let payload = handler
            .call(input_for(&service, device.clone()))
            .await
            .unwrap();
        let token = payload["shortToken"].as_str().unwrap();
        let claims = service.verify_short(token).unwrap();

        assert_eq!(claims.user_id, "u1");
        assert_eq!(claims.user_key, "k1");
        assert_eq!(claims.device_id, Some(device_fingerprint(&device)));
        assert!(claims.session_id.is_some());
    }

    #[tokio::test]
    async fn test_sessions_differ_per_issuance() {
        let service = tokens();
        let device = json!({ "ip": "10.0.0.1", "agent": "curl/8.0" });
        let handler = CreateShortToken::new(service.clone());

        let first = handler.call(input_for(&service, device.clone())).await.unwrap();
        let second = handler.call(input_for(&service, device)).await.unwrap();

        let session = |payload: &Value| {
            service
                .verify_short(payload["shortToken"].as_str().unwrap())
                .unwrap()
                .session_id
        };
        assert_ne!(session(&first), session(&second));
    }

    #[tokio::test]
    async fn test_missing_long_token_fails() {
        let handler = CreateShortToken::new(tokens());
        let result = handler
            .call(HandlerInput::new(Map::new(), ResultBag::new()))
            .await;

        assert!(matches!(result, Err(HandlerError::Failed(_))));
    }
}
