use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use rollcall::router::init_router;
use rollcall::state::{AppConfig, AppState, Collaborators};
use rollcall_auth::{Role, TokenService, device_fingerprint, new_session_id};
use rollcall_cache::{CacheError, Expiry, KeyValueStore, MemoryStore};
use rollcall_config::{RateLimitConfig, TokenConfig};
use rollcall_db::{DirectoryError, UserAuthority, UserDirectory};

pub const SUPERADMIN_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const SCHOOL_ADMIN_ID: &str = "22222222-2222-2222-2222-222222222222";
#[allow(dead_code)]
pub const UNASSIGNED_ADMIN_ID: &str = "33333333-3333-3333-3333-333333333333";
#[allow(dead_code)]
pub const TEACHER_ID: &str = "44444444-4444-4444-4444-444444444444";
#[allow(dead_code)]
pub const INACTIVE_ID: &str = "55555555-5555-5555-5555-555555555555";
pub const SCHOOL_ID: &str = "school-1";

pub fn token_config() -> TokenConfig {
    TokenConfig {
        long_token_secret: "test-long-secret-key-at-least-32-characters".to_string(),
        short_token_secret: "test-short-secret-key-at-least-32-characters".to_string(),
        long_token_expiry: 3600,
        short_token_expiry: 3600,
    }
}

#[allow(dead_code)]
pub fn tokens() -> TokenService {
    TokenService::new(token_config())
}

/// A user directory backed by a map. Users missing from the map are
/// reported as not found, like inactive users.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: HashMap<String, UserAuthority>,
}

impl InMemoryDirectory {
    pub fn with_user(mut self, user_id: &str, role: Role, school_id: Option<&str>) -> Self {
        self.users.insert(
            user_id.to_string(),
            UserAuthority {
                role,
                school_id: school_id.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_active_user_role_and_tenant(
        &self,
        user_id: &str,
    ) -> Result<Option<UserAuthority>, DirectoryError> {
        Ok(self.users.get(user_id).cloned())
    }
}

#[allow(dead_code)]
pub struct FailingDirectory;

#[async_trait]
impl UserDirectory for FailingDirectory {
    async fn find_active_user_role_and_tenant(
        &self,
        _user_id: &str,
    ) -> Result<Option<UserAuthority>, DirectoryError> {
        Err(DirectoryError::Unavailable("connection refused".to_string()))
    }
}

#[allow(dead_code)]
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _expiry: Expiry) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

/// Reads an open window for every client but cannot write.
#[allow(dead_code)]
pub struct WriteFailingStore;

#[async_trait]
impl KeyValueStore for WriteFailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        // one request counted, window resets in 2100
        Ok(Some("1:4102444800".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _expiry: Expiry) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("read-only replica".to_string()))
    }
}

pub fn standard_directory() -> InMemoryDirectory {
    InMemoryDirectory::default()
        .with_user(SUPERADMIN_ID, Role::Superadmin, None)
        .with_user(SCHOOL_ADMIN_ID, Role::SchoolAdmin, Some(SCHOOL_ID))
        .with_user(UNASSIGNED_ADMIN_ID, Role::SchoolAdmin, None)
        .with_user(TEACHER_ID, Role::Other("teacher".to_string()), Some(SCHOOL_ID))
}

pub fn build_app(
    rate_limit: RateLimitConfig,
    cache: Option<Arc<dyn KeyValueStore>>,
    directory: Option<Arc<dyn UserDirectory>>,
) -> Router {
    let config = AppConfig {
        tokens: token_config(),
        rate_limit,
        ..AppConfig::default()
    };
    let state = AppState::new(config, Collaborators { cache, directory })
        .expect("modules should register");
    init_router(state)
}

/// The full stack with an in-memory store and the standard directory.
pub fn test_app() -> Router {
    build_app(
        RateLimitConfig::default(),
        Some(Arc::new(MemoryStore::new())),
        Some(Arc::new(standard_directory())),
    )
}

/// A short token for `user_id`, as the token module would issue it.
#[allow(dead_code)]
pub fn short_token_for(user_id: &str) -> String {
    let device = serde_json::json!({ "ip": "127.0.0.1", "agent": "" });
    tokens()
        .issue_short_token(user_id, "key", &new_session_id(), &device_fingerprint(&device))
        .unwrap()
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "192.168.1.100");
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sends a request and returns its status and JSON body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}
