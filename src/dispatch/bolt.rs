//! The chain executor.
//!
//! A [`Bolt`] runs one call through an exposed entry: its middlewares in
//! declaration order, then the handler. The first middleware that does not
//! advance ends the call. The handler runs at most once, and only after
//! every middleware advanced.
//!
//! Panics in middlewares and handlers are caught here and turned into
//! failure outcomes, so they never reach the transport.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error};

use rollcall_core::{AppError, Outcome, PendingResponse};

use crate::dispatch::CallContext;
use crate::dispatch::registry::{ExposedEntry, HandlerError, HandlerInput};
use crate::middleware::{ResultBag, Step};

/// One call's execution of an exposed entry.
pub struct Bolt<'a> {
    entry: &'a ExposedEntry,
    bag: ResultBag,
    response: PendingResponse,
}

impl<'a> Bolt<'a> {
    pub fn new(entry: &'a ExposedEntry) -> Self {
        Self {
            entry,
            bag: ResultBag::new(),
            response: PendingResponse::new(),
        }
    }

    /// Runs the chain, returning the response metadata and the final outcome.
    pub async fn run(mut self, call: &CallContext) -> (PendingResponse, Outcome) {
        let entry = self.entry;

        for (key, middleware) in &entry.chain {
            let step = AssertUnwindSafe(middleware.run(call, &self.bag, &mut self.response))
                .catch_unwind()
                .await;

            match step {
                Ok(Ok(Step::Advance(value))) => {
                    debug!(middleware = %key, function = %call.function, "Middleware advanced");
                    self.bag.record(*key, value);
                }
                Ok(Ok(Step::Terminate(outcome))) => {
                    debug!(
                        middleware = %key,
                        function = %call.function,
                        status = %outcome.status().as_u16(),
                        "Middleware terminated the chain"
                    );
                    return (self.response, outcome);
                }
                Ok(Err(err)) => {
                    error!(middleware = %key, function = %call.function, error = ?err, "Middleware failed");
                    return (self.response, internal_error());
                }
                Err(_) => {
                    error!(middleware = %key, function = %call.function, "Middleware panicked");
                    return (self.response, internal_error());
                }
            }
        }

        let input = HandlerInput::new(call.input.clone(), self.bag);
        let result = AssertUnwindSafe(entry.handler.call(input))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(Ok(data)) => Outcome::success(data),
            Ok(Err(HandlerError::Rejected(errors))) => Outcome::failure(errors),
            Ok(Err(HandlerError::Failed(err))) => {
                error!(module = %call.module, function = %call.function, error = ?err, "Handler failed");
                execution_failure(&call.function)
            }
            Err(_) => {
                error!(module = %call.module, function = %call.function, "Handler panicked");
                execution_failure(&call.function)
            }
        };

        (self.response, outcome)
    }
}

fn internal_error() -> Outcome {
    AppError::internal(anyhow::anyhow!("internal error")).into_outcome()
}

fn execution_failure(function: &str) -> Outcome {
    Outcome::failure(format!("{function} failed to execute"))
}
