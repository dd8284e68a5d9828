//! On-demand lookup of raw parameter values.
//!
//! [`LazyParameters`] is handed to the validating stage. Values are located the
//! first time a name is asked for and cached afterwards; each declared source is
//! extracted at most once per view.
//!
//! Name lookups need to know which declared parameter they are satisfying, so
//! callers select a parameter by index ([`LazyParameters::has_index`]) before
//! asking for its name. A name asked for without a prior selection is matched
//! against the descriptor's lookup names instead.

use std::collections::HashMap;

use serde_json::Value;
use tracing::trace;

use fastpoint_core::{Params, Request};

use crate::descriptor::{BuiltinType, HandlerDescriptor, ParamSpec, ParamType};
use crate::source::{ParameterSource, Source, SourceKey};

/// Lazily resolved, cached view over a request's raw parameter values.
#[derive(Debug)]
pub struct LazyParameters<'a> {
    descriptor: &'a HandlerDescriptor,
    request: &'a Request,
    current_index: Option<usize>,
    values: HashMap<String, Value>,
    extracted: HashMap<SourceKey, Params>,
}

impl<'a> LazyParameters<'a> {
    /// Creates a view over `request` for the parameters of `descriptor`.
    #[must_use]
    pub fn new(descriptor: &'a HandlerDescriptor, request: &'a Request) -> Self {
        Self {
            descriptor,
            request,
            current_index: None,
            values: HashMap::new(),
            extracted: HashMap::new(),
        }
    }

    /// Selects the parameter at `index` for the next name lookups.
    ///
    /// Returns `true` if the handler declares a parameter at that position.
    pub fn has_index(&mut self, index: usize) -> bool {
        self.current_index = Some(index);
        index < self.descriptor.arity()
    }

    /// Returns the currently selected parameter index.
    #[must_use]
    pub const fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Selects the parameter at `index` and returns its raw value, looked up
    /// under its alias.
    pub fn get_index(&mut self, index: usize) -> Option<&Value> {
        if !self.has_index(index) {
            return None;
        }
        let field = self.descriptor.alias_for(index);
        self.get(&field)
    }

    /// Returns `true` if a raw value exists for `name`.
    pub fn has(&mut self, name: &str) -> bool {
        self.find(name)
    }

    /// Returns the raw value for `name`, locating it on first access.
    pub fn get(&mut self, name: &str) -> Option<&Value> {
        if self.find(name) {
            self.values.get(name)
        } else {
            None
        }
    }

    fn find(&mut self, name: &str) -> bool {
        if self.values.contains_key(name) {
            return true;
        }

        let Some(param) = self.selected_param(name) else {
            return false;
        };
        let declared = self.declared_params(param);

        if param.is_keyed() {
            let builtin = param.types().first().and_then(ParamType::builtin);
            return self.find_by_key(declared.as_ref(), name, builtin);
        }

        let types = param.types();
        if types.len() == 1 {
            return match types[0] {
                ParamType::Class(_) => self.find_whole(declared, name),
                _ => false,
            };
        }

        for builtin in types.iter().filter_map(ParamType::builtin) {
            if self.find_by_key(declared.as_ref(), name, Some(builtin)) {
                return true;
            }
        }
        if types.iter().any(|ty| matches!(ty, ParamType::Class(_))) {
            return self.find_whole(declared, name);
        }
        false
    }

    fn selected_param(&self, name: &str) -> Option<&'a ParamSpec> {
        let index = self
            .current_index
            .or_else(|| self.descriptor.position_of(name))?;
        self.descriptor.get(index)
    }

    /// Merges every declared source; later sources override earlier ones.
    fn declared_params(&mut self, param: &ParamSpec) -> Option<Params> {
        if param.sources().is_empty() {
            return None;
        }
        let mut merged = Params::new();
        for source in param.sources() {
            let params = self.extract(source);
            merged.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Some(merged)
    }

    fn extract(&mut self, source: &Source) -> &Params {
        let request = self.request;
        self.extracted
            .entry(source.cache_key())
            .or_insert_with(|| {
                let params = source.extract(request);
                trace!(source = source.name(), found = params.len(), "source extracted");
                params
            })
    }

    fn find_by_key(&mut self, declared: Option<&Params>, key: &str, ty: Option<BuiltinType>) -> bool {
        let request = self.request;
        let raw = match declared {
            Some(params) => params.get(key),
            None => request
                .url_params()
                .get(key)
                .or_else(|| request.query_params().get(key)),
        };
        let Some(raw) = raw else {
            return false;
        };
        let value = split_scalar(raw, ty);
        self.values.insert(key.to_string(), value);
        true
    }

    /// Object-shaped parameters receive the whole map rather than one key.
    fn find_whole(&mut self, declared: Option<Params>, key: &str) -> bool {
        let params = declared.unwrap_or_else(|| self.json_or_body_params());
        let object = params.into_iter().collect::<serde_json::Map<_, _>>();
        self.values.insert(key.to_string(), Value::Object(object));
        true
    }

    fn json_or_body_params(&self) -> Params {
        if self.request.is_json_content_type() {
            self.request.json_params().cloned().unwrap_or_default()
        } else {
            self.request.body_params().clone()
        }
    }
}

/// Splits scalar raw values on `,` for collection-typed parameters.
fn split_scalar(raw: &Value, ty: Option<BuiltinType>) -> Value {
    if !ty.is_some_and(BuiltinType::is_collection) {
        return raw.clone();
    }
    let text = match raw {
        Value::Array(_) | Value::Object(_) => return raw.clone(),
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    Value::Array(text.split(',').map(|part| Value::String(part.to_string())).collect())
}
