//! Named injectables.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace, warn};

use fastpoint_core::{Arg, PhaseResult, ResolutionError};
use fastpoint_extract::{DefaultValidator, JsonSerializer, Serializer, Validator};

use crate::error::InvokeError;
use crate::handler::Handler;
use crate::invoker::Invoker;
use crate::scope::CallContext;

/// Name under which the validator is always injectable.
pub const VALIDATOR: &str = "validator";

/// Name under which the serializer is always injectable.
pub const SERIALIZER: &str = "serializer";

/// A registered dependency.
#[derive(Clone)]
pub enum Injectable {
    /// Injected as is.
    Literal(Arg),
    /// Invoked with its own resolved arguments; the result is injected.
    Resolver(Handler),
}

impl Injectable {
    /// A literal JSON value.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Literal(Arg::Value(value.into()))
    }

    /// A literal service instance.
    pub fn service<T: Any + Send + Sync>(service: T) -> Self {
        Self::Literal(Arg::service(service))
    }
}

impl From<Handler> for Injectable {
    fn from(handler: Handler) -> Self {
        Self::Resolver(handler)
    }
}

impl From<Arg> for Injectable {
    fn from(arg: Arg) -> Self {
        Self::Literal(arg)
    }
}

impl fmt::Debug for Injectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(arg) => f.debug_tuple("Literal").field(arg).finish(),
            Self::Resolver(handler) => f.debug_tuple("Resolver").field(&handler.name()).finish(),
        }
    }
}

/// Injectables by name.
///
/// A new registry already holds the validator and serializer services, as
/// `Arc<dyn Validator>` and `Arc<dyn Serializer>`.
#[derive(Clone)]
pub struct InjectableRegistry {
    entries: IndexMap<String, Injectable>,
}

impl InjectableRegistry {
    /// Creates a registry holding the default collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self::with_collaborators(Arc::new(DefaultValidator::new()), Arc::new(JsonSerializer::new()))
    }

    /// Creates a registry holding the given collaborators.
    #[must_use]
    pub fn with_collaborators(validator: Arc<dyn Validator>, serializer: Arc<dyn Serializer>) -> Self {
        let mut entries = IndexMap::new();
        entries.insert(VALIDATOR.to_string(), Injectable::service(validator));
        entries.insert(SERIALIZER.to_string(), Injectable::service(serializer));
        Self { entries }
    }

    /// Registers `entry` under `name`.
    ///
    /// An existing entry is only replaced when `override_existing` is set.
    /// Returns `true` if the entry was stored.
    pub fn register(&mut self, name: impl Into<String>, entry: impl Into<Injectable>, override_existing: bool) -> bool {
        let name = name.into();
        if !override_existing && self.entries.contains_key(&name) {
            debug!(injectable = %name, "injectable already registered, keeping existing entry");
            return false;
        }
        self.entries.insert(name, entry.into());
        true
    }

    /// Copies every entry of `parent` whose name is not registered here.
    pub fn merge_missing(&mut self, parent: &Self) {
        for (name, entry) in &parent.entries {
            if !self.entries.contains_key(name) {
                self.entries.insert(name.clone(), entry.clone());
            }
        }
    }

    /// The entry registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Injectable> {
        self.entries.get(name)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produces the value of injectable `name` for handler parameter `parameter`.
    ///
    /// Resolver results are memoized in the request scope, so a resolver runs
    /// at most once per request. A resolver that transitively requires itself
    /// yields [`ResolutionError::InjectableCycle`] without running again.
    pub fn resolve(
        &self,
        name: &str,
        parameter: &str,
        ctx: &mut CallContext<'_>,
        invoker: &Invoker,
    ) -> Result<Arg, InvokeError> {
        if let Some(arg) = ctx.scope().memoized(name) {
            trace!(injectable = name, "using memoized injectable");
            return Ok(arg.clone());
        }

        let handler = match self.entries.get(name) {
            None => {
                return Err(ResolutionError::MissingInjectable {
                    parameter: parameter.to_string(),
                    route: ctx.endpoint().full_route().to_string(),
                }
                .into());
            }
            Some(Injectable::Literal(arg)) => return Ok(arg.clone()),
            Some(Injectable::Resolver(handler)) => handler,
        };

        if !ctx.scope_mut().enter(name) {
            let route = ctx.endpoint().full_route().to_string();
            warn!(
                injectable = name,
                route = %route,
                call_stack = ?ctx.scope().call_stack().collect::<Vec<_>>(),
                "injectable cycle detected"
            );
            return Err(ResolutionError::InjectableCycle {
                name: name.to_string(),
                route,
            }
            .into());
        }

        debug!(injectable = name, resolver = handler.name(), "resolving injectable");
        let result = invoker.call(handler, ctx);
        ctx.scope_mut().exit(name);

        match result? {
            PhaseResult::Continue(arg) => {
                ctx.scope_mut().memoize(name, arg.clone());
                Ok(arg)
            }
            terminal => Err(InvokeError::Halted(terminal)),
        }
    }
}

impl Default for InjectableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InjectableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborators_are_preregistered() {
        let registry = InjectableRegistry::new();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec![VALIDATOR, SERIALIZER]);

        let Some(Injectable::Literal(arg)) = registry.get(VALIDATOR) else {
            panic!("validator should be a literal service");
        };
        assert!(arg.downcast::<Arc<dyn Validator>>().is_some());
    }

    #[test]
    fn test_register_respects_override_flag() {
        let mut registry = InjectableRegistry::new();
        assert!(registry.register("answer", Injectable::value(41), false));
        assert!(!registry.register("answer", Injectable::value(42), false));
        assert!(matches!(
            registry.get("answer"),
            Some(Injectable::Literal(Arg::Value(v))) if v == 41
        ));

        assert!(registry.register("answer", Injectable::value(42), true));
        assert!(matches!(
            registry.get("answer"),
            Some(Injectable::Literal(Arg::Value(v))) if v == 42
        ));
    }

    #[test]
    fn test_merge_missing_keeps_local_entries() {
        let mut parent = InjectableRegistry::new();
        parent.register("user", Injectable::value("parent"), false);
        parent.register("site", Injectable::value("blog"), false);

        let mut child = InjectableRegistry::new();
        child.register("user", Injectable::value("child"), false);
        child.merge_missing(&parent);

        assert!(matches!(
            child.get("user"),
            Some(Injectable::Literal(Arg::Value(v))) if v == "child"
        ));
        assert!(child.contains("site"));
        assert_eq!(child.len(), 4);
    }

    proptest::proptest! {
        #[test]
        fn prop_first_registration_wins_without_override(
            values in proptest::collection::vec(0i64..1000, 1..8),
        ) {
            let mut registry = InjectableRegistry::new();
            for value in &values {
                registry.register("n", Injectable::value(*value), false);
            }
            let stored = match registry.get("n") {
                Some(Injectable::Literal(Arg::Value(v))) => v.as_i64(),
                _ => None,
            };
            proptest::prop_assert_eq!(stored, values.first().copied());
        }

        #[test]
        fn prop_last_registration_wins_with_override(
            values in proptest::collection::vec(0i64..1000, 1..8),
        ) {
            let mut registry = InjectableRegistry::new();
            for value in &values {
                proptest::prop_assert!(registry.register("n", Injectable::value(*value), true));
            }
            let stored = match registry.get("n") {
                Some(Injectable::Literal(Arg::Value(v))) => v.as_i64(),
                _ => None,
            };
            proptest::prop_assert_eq!(stored, values.last().copied());
        }
    }
}
