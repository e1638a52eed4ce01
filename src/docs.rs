use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use rollcall_auth::TokenClaims;
use rollcall_core::ResponseEnvelope;

use crate::dispatch::ExposedDescription;
use crate::modules::identity::model::TenantResponse;
use crate::modules::token::model::ShortTokenResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::router::health,
        crate::router::api_entry,
    ),
    components(
        schemas(
            ResponseEnvelope,
            TokenClaims,
            ShortTokenResponse,
            TenantResponse,
            ExposedDescription,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Dispatch", description = "Module function calls. Call `system/exposed` for the catalog"),
        (name = "System", description = "Service health")
    ),
    info(
        title = "Rollcall API",
        version = "0.1.0",
        description = "Module dispatch API with long and short token authentication, role gates and rate limiting.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("token"))),
            )
        }
    }
}
