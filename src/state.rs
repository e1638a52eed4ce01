use std::sync::Arc;
use tracing::{info, warn};

use rollcall_auth::TokenService;
use rollcall_cache::{CacheConfig, KeyValueStore, RedisCache};
use rollcall_config::{CorsConfig, RateLimitConfig, TokenConfig};
use rollcall_db::{PgUserDirectory, UserDirectory, init_db_pool};

use crate::dispatch::{Dispatcher, RegistryError};
use crate::middleware::MiddlewareSet;
use crate::modules;

/// Configuration loaded at startup.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub tokens: TokenConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            tokens: TokenConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            cors: CorsConfig::from_env(),
        }
    }
}

/// External services the middlewares depend on. Both are optional.
#[derive(Clone, Default)]
pub struct Collaborators {
    /// Rate limit counters; the limiter fails open without it
    pub cache: Option<Arc<dyn KeyValueStore>>,
    /// Role and school lookups; `__token` skips hydration without it
    pub directory: Option<Arc<dyn UserDirectory>>,
}

impl Collaborators {
    /// Connects to Redis (`REDIS_URL`) and PostgreSQL (`DATABASE_URL`).
    ///
    /// Neither connection is fatal: a missing service is logged and left out.
    pub async fn from_env() -> Self {
        let cache = match RedisCache::new(&CacheConfig::from_env()).await {
            Ok(cache) => {
                info!("Connected to Redis");
                Some(Arc::new(cache) as Arc<dyn KeyValueStore>)
            }
            Err(e) => {
                warn!(error = %e, "Redis unavailable, rate limiting disabled");
                None
            }
        };

        let directory = match std::env::var("DATABASE_URL") {
            Ok(url) => match init_db_pool(&url).await {
                Ok(pool) => Some(Arc::new(PgUserDirectory::new(pool)) as Arc<dyn UserDirectory>),
                Err(e) => {
                    warn!(error = %e, "Database unavailable, token hydration disabled");
                    None
                }
            },
            Err(_) => {
                warn!("DATABASE_URL not set, token hydration disabled");
                None
            }
        };

        Self { cache, directory }
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub tokens: TokenService,
    pub cors_config: CorsConfig,
}

impl AppState {
    /// Builds the registry and dispatcher.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] when a module declaration is invalid.
    pub fn new(config: AppConfig, collaborators: Collaborators) -> Result<Self, RegistryError> {
        let tokens = TokenService::new(config.tokens);
        let middlewares = MiddlewareSet::standard(&tokens, &config.rate_limit, &collaborators);
        let dispatcher = modules::init_dispatcher(&tokens, &middlewares)?;

        Ok(Self {
            dispatcher,
            tokens,
            cors_config: config.cors,
        })
    }
}

pub async fn init_app_state() -> Result<AppState, RegistryError> {
    AppState::new(AppConfig::from_env(), Collaborators::from_env().await)
}
