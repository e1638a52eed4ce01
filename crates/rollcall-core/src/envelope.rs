//! Response envelope and dispatch.
//!
//! Every middleware and handler result is expressed as an [`Outcome`]. The
//! [`dispatch`] function turns an outcome into the wire [`ResponseEnvelope`]
//! and an HTTP status code. Nothing else in the service writes response
//! bodies.
//!
//! # Status code selection
//!
//! - `outcome.code` when present
//! - `200 OK` when `ok` is true
//! - `400 Bad Request` otherwise

use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

/// The result of processing one call, before normalization.
///
/// `msg` is accepted as an alias for `message` when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    #[serde(default, alias = "msg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl Outcome {
    /// A successful outcome carrying `data`.
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            ..Self::default()
        }
    }

    /// A failed outcome carrying `errors` (a string or an array).
    pub fn failure(errors: impl Into<Value>) -> Self {
        Self {
            ok: false,
            errors: Some(errors.into()),
            ..Self::default()
        }
    }

    /// A failed outcome whose explanation travels in `message`.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: StatusCode) -> Self {
        self.code = Some(code.as_u16());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The HTTP status this outcome is sent with.
    ///
    /// An explicit code that is not a valid HTTP status falls back to the
    /// default for `ok`.
    pub fn status(&self) -> StatusCode {
        self.code
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(if self.ok {
                StatusCode::OK
            } else {
                StatusCode::BAD_REQUEST
            })
    }

    /// Normalizes this outcome into the wire envelope.
    pub fn into_envelope(self) -> ResponseEnvelope {
        ResponseEnvelope {
            ok: self.ok,
            data: self.data.unwrap_or_else(|| json!({})),
            errors: self.errors.unwrap_or_else(|| json!([])),
            message: self.message.unwrap_or_default(),
        }
    }
}

/// The body of every API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResponseEnvelope {
    /// Whether the call succeeded
    pub ok: bool,
    /// Handler payload, `{}` when absent
    #[schema(value_type = Object)]
    pub data: Value,
    /// A string or an array of strings, `[]` when absent
    #[schema(value_type = Object)]
    pub errors: Value,
    /// Human readable message, empty when absent
    pub message: String,
}

/// Response metadata accumulated while a call is processed.
///
/// Middlewares may add headers here (for example rate limit information);
/// the body is only ever produced by [`dispatch`].
#[derive(Debug, Clone, Default)]
pub struct PendingResponse {
    pub headers: HeaderMap,
}

impl PendingResponse {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Turns an outcome into the HTTP response sent to the client.
pub fn dispatch(pending: PendingResponse, outcome: Outcome) -> Response {
    let status = outcome.status();
    let envelope = outcome.into_envelope();

    tracing::debug!(status = %status.as_u16(), ok = envelope.ok, "Dispatching response");

    (status, pending.headers, Json(envelope)).into_response()
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        dispatch(PendingResponse::default(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_defaults_to_200_with_empty_errors() {
        let response = dispatch(PendingResponse::new(), Outcome::success(json!({ "id": 1 })));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "ok": true, "data": { "id": 1 }, "errors": [], "message": "" })
        );
    }

    #[tokio::test]
    async fn test_failure_defaults_to_400_with_empty_data() {
        let response = dispatch(PendingResponse::new(), Outcome::failure("Something wrong"));

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "ok": false, "data": {}, "errors": "Something wrong", "message": "" })
        );
    }

    #[tokio::test]
    async fn test_explicit_code_overrides_default() {
        let outcome = Outcome::failure("unauthorized").with_code(StatusCode::UNAUTHORIZED);
        let response = dispatch(PendingResponse::new(), outcome);

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["errors"], "unauthorized");
    }

    #[test]
    fn test_msg_is_accepted_as_message_alias() {
        let outcome: Outcome =
            serde_json::from_value(json!({ "ok": true, "msg": "Success message" })).unwrap();

        assert_eq!(outcome.into_envelope().message, "Success message");
    }

    #[test]
    fn test_invalid_code_falls_back_to_default() {
        let outcome = Outcome {
            ok: false,
            code: Some(42),
            ..Outcome::default()
        };
        assert_eq!(outcome.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pending_headers_are_sent() {
        let mut pending = PendingResponse::new();
        pending
            .headers
            .insert("x-ratelimit-limit", "100".parse().unwrap());

        let response = dispatch(pending, Outcome::success(json!({})));

        assert_eq!(response.headers()["x-ratelimit-limit"], "100");
    }
}
