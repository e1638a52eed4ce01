use crate::dispatch::ModuleDescriptor;
use crate::middleware::MiddlewareKey;

use super::controller::{Catalog, ListExposed};

pub fn init_system_module(catalog: Catalog) -> ModuleDescriptor {
    ModuleDescriptor::new("system").expose(
        "get=exposed",
        ListExposed::new(catalog),
        &[
            MiddlewareKey::RateLimit,
            MiddlewareKey::Token,
            MiddlewareKey::Superadmin,
        ],
    )
}
