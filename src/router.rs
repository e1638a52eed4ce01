use axum::body::to_bytes;
use axum::extract::{ConnectInfo, Path, Query, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Router, middleware};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use rollcall_core::{AppError, Outcome};

use crate::dispatch::Transport;
use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::auth::TOKEN_HEADER;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn init_router(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .route("/api/{module}/{function}", any(api_entry))
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static(TOKEN_HEADER),
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .expose_headers([
            HeaderName::from_static(crate::middleware::rate_limit::LIMIT_HEADER),
            HeaderName::from_static(crate::middleware::rate_limit::REMAINING_HEADER),
            HeaderName::from_static(crate::middleware::rate_limit::RESET_HEADER),
        ])
        .allow_credentials(true)
}

/// Service health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = rollcall_core::ResponseEnvelope)
    ),
    tag = "System"
)]
pub async fn health() -> Outcome {
    Outcome::success(json!({ "status": "ok" }))
}

/// Call an exposed module function
///
/// The JSON object body (if any) is merged over the query parameters and
/// passed to the function. Every response uses the standard envelope.
#[utoipa::path(
    method(get, post, put, delete),
    path = "/api/{module}/{function}",
    params(
        ("module" = String, Path, description = "Registered module name"),
        ("function" = String, Path, description = "Exposed function name"),
        ("token" = Option<String>, Header, description = "Long or short token, when the function requires one")
    ),
    responses(
        (status = 200, description = "Function succeeded", body = rollcall_core::ResponseEnvelope),
        (status = 400, description = "Unknown module, verb or function, or the function failed", body = rollcall_core::ResponseEnvelope),
        (status = 401, description = "Missing, invalid or expired token, or inactive user", body = rollcall_core::ResponseEnvelope),
        (status = 403, description = "Role or school assignment check failed", body = rollcall_core::ResponseEnvelope),
        (status = 429, description = "Rate limit exceeded", body = rollcall_core::ResponseEnvelope)
    ),
    tag = "Dispatch",
    security((), ("token" = []))
)]
pub async fn api_entry(
    State(state): State<AppState>,
    Path((module, function)): Path<(String, String)>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();

    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_address(&parts.headers, peer);

    let mut input = query_input(&parts.uri);
    match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => merge_body(&mut input, &bytes),
        Err(e) => return AppError::bad_request(e).into_response(),
    }

    state
        .dispatcher
        .handle(
            parts.method,
            module,
            function,
            input,
            Transport {
                headers: parts.headers,
                client,
            },
        )
        .await
}

/// The first `X-Forwarded-For` entry, else the peer address, else `unknown`.
fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn query_input(uri: &Uri) -> Map<String, Value> {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(params)| {
            params
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect()
        })
        .unwrap_or_default()
}

/// Body fields win over query parameters. Non-object bodies are ignored.
fn merge_body(input: &mut Map<String, Value>, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }
    if let Ok(Value::Object(body)) = serde_json::from_slice::<Value>(bytes) {
        input.extend(body);
    }
}
