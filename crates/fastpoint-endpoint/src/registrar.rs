//! The host route table seen from the endpoint side.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::endpoint::Endpoint;
use crate::error::RegistrationError;

/// Arguments handed to the host when a route is registered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteArgs {
    /// HTTP method(s), as the host expects them.
    pub methods: String,
    /// Whether the endpoint declares permission handlers.
    pub permission_callback: bool,
    /// Plugins the route depends on.
    pub depends: Option<Vec<String>>,
    /// Any other host-specific argument.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteArgs {
    /// Creates arguments for a route served with `methods`.
    #[must_use]
    pub fn new(methods: impl Into<String>) -> Self {
        Self {
            methods: methods.into(),
            permission_callback: false,
            depends: None,
            extra: Map::new(),
        }
    }

    /// Applies user overrides. Known keys replace the matching field; others land in `extra`.
    pub fn merge(&mut self, overrides: &Map<String, Value>) {
        for (key, value) in overrides {
            match (key.as_str(), value) {
                ("methods", Value::String(methods)) => self.methods.clone_from(methods),
                ("depends", Value::Array(items)) => {
                    self.depends = Some(items.iter().filter_map(Value::as_str).map(String::from).collect());
                }
                ("depends", Value::Null) => self.depends = None,
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

/// The host's route table.
pub trait RouteRegistrar {
    /// Registers `endpoint` under `/{namespace}/{route}`.
    fn register_route(
        &mut self,
        namespace: &str,
        route: &str,
        args: RouteArgs,
        endpoint: Arc<Endpoint>,
        override_existing: bool,
    ) -> Result<(), RegistrationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overrides_known_keys() {
        let mut args = RouteArgs::new("GET");
        let Value::Object(overrides) = json!({
            "methods": "GET, POST",
            "depends": ["buddypress"],
            "show_in_index": false
        }) else {
            unreachable!()
        };
        args.merge(&overrides);

        assert_eq!(args.methods, "GET, POST");
        assert_eq!(args.depends, Some(vec!["buddypress".to_string()]));
        assert_eq!(args.extra["show_in_index"], json!(false));
    }

    #[test]
    fn test_serialized_shape() {
        let mut args = RouteArgs::new("DELETE");
        args.permission_callback = true;
        args.extra.insert("custom".into(), json!(1));
        assert_eq!(
            serde_json::to_value(&args).expect("serializable"),
            json!({"methods": "DELETE", "permission_callback": true, "depends": null, "custom": 1})
        );
    }
}
