//! Resolves incoming calls and runs them.

use axum::http::{HeaderMap, Method};
use axum::response::Response;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{instrument, warn};

use rollcall_core::{Outcome, PendingResponse, dispatch};

use crate::dispatch::bolt::Bolt;
use crate::dispatch::registry::{ExposedEntry, Registry};
use crate::dispatch::{CallContext, Verb};
use crate::metrics::track_dispatch;

/// Transport details of a call that are not part of its input.
#[derive(Debug, Clone, Default)]
pub struct Transport {
    pub headers: HeaderMap,
    pub client: String,
}

/// Entry point of every `/api/{module}/{function}` call.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Finds the exposed entry for a call.
    ///
    /// # Errors
    ///
    /// Returns the `400` outcome to respond with when the module, verb or
    /// function cannot be resolved.
    pub fn resolve(
        &self,
        method: &Method,
        module: &str,
        function: &str,
    ) -> Result<(Verb, &ExposedEntry), Outcome> {
        let registered = self
            .registry
            .module(module)
            .ok_or_else(|| Outcome::rejected(format!("module {module} not found")))?;

        let verb = Verb::from_method(method)
            .filter(|verb| registered.supports(*verb))
            .ok_or_else(|| Outcome::rejected(format!("unsupported method {method}")))?;

        let entry = registered.entry(verb, function).ok_or_else(|| {
            Outcome::rejected(format!(
                "unable to find function {function} for verb {verb}"
            ))
        })?;

        Ok((verb, entry))
    }

    /// Resolves and runs one call, producing the final response.
    #[instrument(skip(self, input, transport), fields(client = %transport.client))]
    pub async fn handle(
        &self,
        method: Method,
        module: String,
        function: String,
        input: Map<String, Value>,
        transport: Transport,
    ) -> Response {
        let (verb, entry) = match self.resolve(&method, &module, &function) {
            Ok(resolved) => resolved,
            Err(outcome) => {
                warn!(
                    module = %module,
                    function = %function,
                    method = %method,
                    reason = outcome.message.as_deref().unwrap_or_default(),
                    "Unresolvable call"
                );
                track_dispatch(&module, &function, outcome.status());
                return dispatch(PendingResponse::new(), outcome);
            }
        };

        let call = CallContext {
            verb,
            module,
            function,
            input,
            headers: transport.headers,
            client: transport.client,
        };

        let (pending, outcome) = Bolt::new(entry).run(&call).await;
        track_dispatch(&call.module, &call.function, outcome.status());

        dispatch(pending, outcome)
    }
}
