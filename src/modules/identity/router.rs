use crate::dispatch::ModuleDescriptor;
use crate::middleware::MiddlewareKey;

use super::controller::{tenant, whoami};

pub fn init_identity_module() -> ModuleDescriptor {
    ModuleDescriptor::new("identity")
        .with_middlewares(&[MiddlewareKey::RateLimit, MiddlewareKey::Token])
        .expose("get=whoami", whoami, &[])
        .expose("get=tenant", tenant, &[MiddlewareKey::SchoolAdmin])
}
