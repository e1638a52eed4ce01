use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::instrument;

use crate::dispatch::{ExposedDescription, Handler, HandlerError, HandlerInput, to_payload};

/// The registration table, published once the registry is built.
#[derive(Clone, Debug, Default)]
pub struct Catalog(Arc<OnceLock<Vec<ExposedDescription>>>);

impl Catalog {
    /// Sets the table. Later calls are ignored.
    pub fn publish(&self, entries: Vec<ExposedDescription>) {
        let _ = self.0.set(entries);
    }

    pub fn entries(&self) -> &[ExposedDescription] {
        self.0.get().map(Vec::as_slice).unwrap_or_default()
    }
}

/// Lists every exposed function with its verb and middlewares.
#[derive(Clone, Debug)]
pub struct ListExposed {
    catalog: Catalog,
}

impl ListExposed {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Handler for ListExposed {
    #[instrument(skip(self, _input))]
    async fn call(&self, _input: HandlerInput) -> Result<Value, HandlerError> {
        to_payload(&self.catalog.entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dispatch::Verb;

    fn row(function: &str) -> ExposedDescription {
        ExposedDescription {
            module: "school".to_string(),
            verb: Verb::Get,
            function: function.to_string(),
            middlewares: vec!["__token".to_string()],
        }
    }

    #[test]
    fn test_catalog_is_published_once() {
        let catalog = Catalog::default();
        assert!(catalog.entries().is_empty());

        catalog.publish(vec![row("first")]);
        catalog.publish(vec![row("second")]);

        assert_eq!(catalog.entries(), &[row("first")]);
    }
}
