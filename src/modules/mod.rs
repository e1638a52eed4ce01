//! Exposed modules.
//!
//! Each module mirrors the same layout:
//!
//! - `mod.rs`: module exports
//! - `controller.rs`: the handlers
//! - `model.rs`: response payloads
//! - `router.rs`: the [`ModuleDescriptor`](crate::dispatch::ModuleDescriptor)
//!   declaring what is exposed and behind which middlewares

pub mod identity;
pub mod system;
pub mod token;

use std::sync::Arc;

use rollcall_auth::TokenService;

use crate::dispatch::{Dispatcher, Registry, RegistryError};
use crate::middleware::MiddlewareSet;

use self::identity::init_identity_module;
use self::system::{Catalog, init_system_module};
use self::token::init_token_module;

/// Registers every module and returns the dispatcher serving them.
///
/// # Errors
///
/// Returns a [`RegistryError`] when a declaration is invalid or needs a
/// middleware `middlewares` does not provide.
pub fn init_dispatcher(
    tokens: &TokenService,
    middlewares: &MiddlewareSet,
) -> Result<Dispatcher, RegistryError> {
    let catalog = Catalog::default();

    let registry = Registry::builder()
        .module(init_token_module(tokens.clone()))
        .module(init_identity_module())
        .module(init_system_module(catalog.clone()))
        .build(middlewares)?;

    catalog.publish(registry.describe());

    Ok(Dispatcher::new(Arc::new(registry)))
}
