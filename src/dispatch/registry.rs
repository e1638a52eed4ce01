//! Module registration.
//!
//! Modules declare their exposed functions as `"<verb>=<function>"` strings
//! together with a handler and the middlewares it runs behind. The
//! declarations are parsed once by [`RegistryBuilder::build`], which fails on
//! any misconfiguration, so a running [`Registry`] never needs to parse
//! anything per request.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use utoipa::ToSchema;

use rollcall_auth::TokenClaims;

use crate::dispatch::Verb;
use crate::middleware::{Middleware, MiddlewareKey, MiddlewareSet, ResultBag};

/// Misconfigured module declarations, reported at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("module `{module}`: malformed declaration `{declaration}`, expected `<verb>=<function>`")]
    MalformedDeclaration { module: String, declaration: String },

    #[error("module `{module}`: unsupported verb in `{declaration}`")]
    UnsupportedVerb { module: String, declaration: String },

    #[error("module `{0}` is registered more than once")]
    DuplicateModule(String),

    #[error("module `{module}`: `{verb}={function}` is exposed more than once")]
    DuplicateEntry {
        module: String,
        verb: Verb,
        function: String,
    },

    #[error("module `{module}`: `{function}` lists middleware `{key}` more than once")]
    RepeatedMiddleware {
        module: String,
        function: String,
        key: MiddlewareKey,
    },

    #[error("module `{module}`: `{function}` needs middleware `{key}`, which is not provided")]
    MissingMiddleware {
        module: String,
        function: String,
        key: MiddlewareKey,
    },
}

/// Errors a handler may return.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A domain rejection, reported to the client as `errors`.
    #[error("rejected: {0}")]
    Rejected(Value),

    /// An unexpected failure. Only the function name reaches the client.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn rejected(errors: impl Into<Value>) -> Self {
        HandlerError::Rejected(errors.into())
    }
}

/// Serializes a handler's response payload.
pub fn to_payload<T: Serialize>(value: &T) -> Result<Value, HandlerError> {
    serde_json::to_value(value).map_err(|e| HandlerError::Failed(e.into()))
}

/// What a handler receives: the call input with the middleware results
/// merged in.
#[derive(Debug, Clone)]
pub struct HandlerInput {
    pub data: Map<String, Value>,
    results: ResultBag,
}

impl HandlerInput {
    pub fn new(input: Map<String, Value>, results: ResultBag) -> Self {
        Self {
            data: results.merge_into(input),
            results,
        }
    }

    pub fn results(&self) -> &ResultBag {
        &self.results
    }

    /// Short-token claims recorded by the token middleware.
    pub fn claims(&self) -> Option<TokenClaims> {
        self.results.claims()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

/// The terminal step of an exposed function.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, input: HandlerInput) -> Result<Value, HandlerError>;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(HandlerInput) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    async fn call(&self, input: HandlerInput) -> Result<Value, HandlerError> {
        (self)(input).await
    }
}

struct Declaration {
    declaration: String,
    handler: Arc<dyn Handler>,
    middlewares: Vec<MiddlewareKey>,
}

/// A module's exposed functions, as declared.
pub struct ModuleDescriptor {
    name: String,
    middlewares: Vec<MiddlewareKey>,
    declarations: Vec<Declaration>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            middlewares: Vec::new(),
            declarations: Vec::new(),
        }
    }

    /// Middlewares run before every exposed function of this module.
    pub fn with_middlewares(mut self, keys: &[MiddlewareKey]) -> Self {
        self.middlewares.extend_from_slice(keys);
        self
    }

    /// Exposes `handler` as `declaration` (for example `"post=createSchool"`)
    /// behind `middlewares`, after the module-level ones.
    pub fn expose(
        mut self,
        declaration: impl Into<String>,
        handler: impl Handler + 'static,
        middlewares: &[MiddlewareKey],
    ) -> Self {
        self.declarations.push(Declaration {
            declaration: declaration.into(),
            handler: Arc::new(handler),
            middlewares: middlewares.to_vec(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A resolved exposed function.
pub struct ExposedEntry {
    pub verb: Verb,
    pub function: String,
    pub(crate) chain: Vec<(MiddlewareKey, Arc<dyn Middleware>)>,
    pub(crate) handler: Arc<dyn Handler>,
}

impl ExposedEntry {
    pub fn middleware_keys(&self) -> impl Iterator<Item = MiddlewareKey> + '_ {
        self.chain.iter().map(|(key, _)| *key)
    }
}

/// A registered module and its entries.
pub struct RegisteredModule {
    pub name: String,
    entries: HashMap<(Verb, String), ExposedEntry>,
}

impl RegisteredModule {
    /// Whether any function is exposed under `verb`.
    pub fn supports(&self, verb: Verb) -> bool {
        self.entries.keys().any(|(entry_verb, _)| *entry_verb == verb)
    }

    pub fn entry(&self, verb: Verb, function: &str) -> Option<&ExposedEntry> {
        self.entries.get(&(verb, function.to_string()))
    }
}

/// One row of the registration table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExposedDescription {
    pub module: String,
    #[schema(value_type = String)]
    pub verb: Verb,
    pub function: String,
    pub middlewares: Vec<String>,
}

/// Every registered module, keyed by name. Immutable once built.
pub struct Registry {
    modules: HashMap<String, RegisteredModule>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.modules.keys().collect();
        names.sort();
        f.debug_struct("Registry").field("modules", &names).finish()
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn module(&self, name: &str) -> Option<&RegisteredModule> {
        self.modules.get(name)
    }

    /// The registration table, sorted by module, function and verb.
    pub fn describe(&self) -> Vec<ExposedDescription> {
        let mut rows: BTreeMap<(&str, &str, Verb), ExposedDescription> = BTreeMap::new();

        for module in self.modules.values() {
            for entry in module.entries.values() {
                rows.insert(
                    (module.name.as_str(), entry.function.as_str(), entry.verb),
                    ExposedDescription {
                        module: module.name.clone(),
                        verb: entry.verb,
                        function: entry.function.clone(),
                        middlewares: entry
                            .middleware_keys()
                            .map(|key| key.as_str().to_string())
                            .collect(),
                    },
                );
            }
        }

        rows.into_values().collect()
    }
}

/// Collects module descriptors until [`build`](Self::build).
#[derive(Default)]
pub struct RegistryBuilder {
    modules: Vec<ModuleDescriptor>,
}

impl RegistryBuilder {
    pub fn module(mut self, module: ModuleDescriptor) -> Self {
        self.modules.push(module);
        self
    }

    /// Parses every declaration and binds every middleware key to `middlewares`.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError`] found.
    pub fn build(self, middlewares: &MiddlewareSet) -> Result<Registry, RegistryError> {
        let mut modules = HashMap::new();

        for descriptor in self.modules {
            if modules.contains_key(&descriptor.name) {
                return Err(RegistryError::DuplicateModule(descriptor.name));
            }

            let module = register_module(descriptor, middlewares)?;
            modules.insert(module.name.clone(), module);
        }

        Ok(Registry { modules })
    }
}

fn register_module(
    descriptor: ModuleDescriptor,
    middlewares: &MiddlewareSet,
) -> Result<RegisteredModule, RegistryError> {
    let ModuleDescriptor {
        name,
        middlewares: module_keys,
        declarations,
    } = descriptor;

    let mut entries = HashMap::new();

    for declaration in declarations {
        let (verb, function) = parse_declaration(&name, &declaration.declaration)?;

        if entries.contains_key(&(verb, function.clone())) {
            return Err(RegistryError::DuplicateEntry {
                module: name,
                verb,
                function,
            });
        }

        let mut seen = HashSet::new();
        let mut chain = Vec::new();
        for key in module_keys.iter().chain(&declaration.middlewares).copied() {
            if !seen.insert(key) {
                return Err(RegistryError::RepeatedMiddleware {
                    module: name,
                    function,
                    key,
                });
            }
            let Some(middleware) = middlewares.get(key) else {
                return Err(RegistryError::MissingMiddleware {
                    module: name,
                    function,
                    key,
                });
            };
            chain.push((key, middleware));
        }

        entries.insert(
            (verb, function.clone()),
            ExposedEntry {
                verb,
                function,
                chain,
                handler: declaration.handler,
            },
        );
    }

    Ok(RegisteredModule { name, entries })
}

fn parse_declaration(module: &str, declaration: &str) -> Result<(Verb, String), RegistryError> {
    let malformed = || RegistryError::MalformedDeclaration {
        module: module.to_string(),
        declaration: declaration.to_string(),
    };

    let (verb, function) = declaration.split_once('=').ok_or_else(malformed)?;
    let function = function.trim();

    let valid_name = !function.is_empty()
        && function
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_name {
        return Err(malformed());
    }

    let verb = Verb::parse(verb.trim()).ok_or_else(|| RegistryError::UnsupportedVerb {
        module: module.to_string(),
        declaration: declaration.to_string(),
    })?;

    Ok((verb, function.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::middleware::role::SuperadminGate;

    async fn noop(_input: HandlerInput) -> Result<Value, HandlerError> {
        Ok(json!({}))
    }

    fn middlewares() -> MiddlewareSet {
        MiddlewareSet::new().with(MiddlewareKey::Superadmin, SuperadminGate)
    }

    fn build(module: ModuleDescriptor) -> Result<Registry, RegistryError> {
        Registry::builder().module(module).build(&middlewares())
    }

    #[test]
    fn test_parse_declarations() {
        assert_eq!(
            parse_declaration("school", "post=createSchool"),
            Ok((Verb::Post, "createSchool".to_string()))
        );
        assert!(matches!(
            parse_declaration("school", "createSchool"),
            Err(RegistryError::MalformedDeclaration { .. })
        ));
        assert!(matches!(
            parse_declaration("school", "get="),
            Err(RegistryError::MalformedDeclaration { .. })
        ));
        assert!(matches!(
            parse_declaration("school", "get=create-school"),
            Err(RegistryError::MalformedDeclaration { .. })
        ));
        assert!(matches!(
            parse_declaration("school", "patch=updateSchool"),
            Err(RegistryError::UnsupportedVerb { .. })
        ));
    }

    #[test]
    fn test_module_middlewares_run_first() {
        let registry = build(
            ModuleDescriptor::new("school")
                .with_middlewares(&[MiddlewareKey::Superadmin])
                .expose("get=getSchool", noop, &[]),
        )
        .unwrap();

        let module = registry.module("school").unwrap();
        let entry = module.entry(Verb::Get, "getSchool").unwrap();
        assert_eq!(
            entry.middleware_keys().collect::<Vec<_>>(),
            vec![MiddlewareKey::Superadmin]
        );
        assert!(module.supports(Verb::Get));
        assert!(!module.supports(Verb::Post));
    }

    #[test]
    fn test_same_function_under_two_verbs() {
        let registry = build(
            ModuleDescriptor::new("school")
                .expose("get=school", noop, &[])
                .expose("delete=school", noop, &[]),
        )
        .unwrap();

        let module = registry.module("school").unwrap();
        assert!(module.entry(Verb::Get, "school").is_some());
        assert!(module.entry(Verb::Delete, "school").is_some());
        assert!(module.entry(Verb::Put, "school").is_none());
    }

    #[test]
    fn test_rejects_duplicate_entries() {
        let result = build(
            ModuleDescriptor::new("school")
                .expose("get=getSchool", noop, &[])
                .expose("get=getSchool", noop, &[]),
        );
        assert!(matches!(result, Err(RegistryError::DuplicateEntry { .. })));
    }

    #[test]
    fn test_rejects_duplicate_modules() {
        let result = Registry::builder()
            .module(ModuleDescriptor::new("school"))
            .module(ModuleDescriptor::new("school"))
            .build(&middlewares());
        assert_eq!(
            result.err(),
            Some(RegistryError::DuplicateModule("school".to_string()))
        );
    }

    #[test]
    fn test_rejects_missing_middleware() {
        let result = build(ModuleDescriptor::new("school").expose(
            "get=getSchool",
            noop,
            &[MiddlewareKey::Token],
        ));
        assert!(matches!(
            result,
            Err(RegistryError::MissingMiddleware {
                key: MiddlewareKey::Token,
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_repeated_middleware() {
        let result = build(
            ModuleDescriptor::new("school")
                .with_middlewares(&[MiddlewareKey::Superadmin])
                .expose("get=getSchool", noop, &[MiddlewareKey::Superadmin]),
        );
        assert!(matches!(
            result,
            Err(RegistryError::RepeatedMiddleware { .. })
        ));
    }

    #[test]
    fn test_describe_lists_entries_in_order() {
        let registry = Registry::builder()
            .module(
                ModuleDescriptor::new("school")
                    .expose("post=createSchool", noop, &[MiddlewareKey::Superadmin])
                    .expose("get=allSchools", noop, &[]),
            )
            .module(ModuleDescriptor::new("auth").expose("post=login", noop, &[]))
            .build(&middlewares())
            .unwrap();

        let rows: Vec<_> = registry
            .describe()
            .into_iter()
            .map(|row| format!("{}.{}={}", row.module, row.verb, row.function))
            .collect();
        assert_eq!(
            rows,
            vec![
                "auth.post=login",
                "school.get=allSchools",
                "school.post=createSchool"
            ]
        );
    }

    #[test]
    fn test_handler_input_merges_results() {
        let mut results = ResultBag::new();
        results.record(MiddlewareKey::Superadmin, json!({ "userId": "u1" }));
        let mut input = Map::new();
        input.insert("name".to_string(), json!("Test"));

        let input = HandlerInput::new(input, results);
        assert_eq!(input.get("name"), Some(&json!("Test")));
        assert_eq!(input.get("__superadmin"), Some(&json!({ "userId": "u1" })));
    }
}
