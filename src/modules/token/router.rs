use rollcall_auth::TokenService;

use crate::dispatch::ModuleDescriptor;
use crate::middleware::MiddlewareKey;

use super::controller::CreateShortToken;

pub fn init_token_module(tokens: TokenService) -> ModuleDescriptor {
    ModuleDescriptor::new("token").expose(
        "post=v1_createShortToken",
        CreateShortToken::new(tokens),
        &[MiddlewareKey::LongToken, MiddlewareKey::Device],
    )
}
