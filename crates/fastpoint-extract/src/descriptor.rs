//! Handler descriptors.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::case::AliasGenerator;
use crate::schema::Schema;
use crate::source::Source;

/// Builtin parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// Integer.
    Int,
    /// Floating point number.
    Float,
    /// Boolean.
    Bool,
    /// String.
    String,
    /// List (or map) of values.
    Array,
    /// Map of values.
    Object,
    /// Anything.
    Mixed,
    /// `null` only.
    Null,
}

impl BuiltinType {
    /// Type name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "integer",
            Self::Float => "number",
            Self::Bool => "boolean",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Mixed => "mixed",
            Self::Null => "null",
        }
    }

    /// Returns `true` for `Array` and `Object`.
    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(self, Self::Array | Self::Object)
    }
}

/// Context objects supplied by the lifecycle rather than the request data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// The request.
    Request,
    /// The response.
    Response,
    /// The endpoint.
    Endpoint,
    /// The exception being handled.
    Exception,
}

impl ContextKind {
    /// The parameter name that selects this context object.
    #[must_use]
    pub const fn well_known_name(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::Endpoint => "endpoint",
            Self::Exception => "exception",
        }
    }

    /// Maps a parameter name to a context object.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "request" => Some(Self::Request),
            "response" => Some(Self::Response),
            "endpoint" => Some(Self::Endpoint),
            "exception" => Some(Self::Exception),
            _ => None,
        }
    }
}

/// One member of a parameter's declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    /// A builtin type.
    Builtin(BuiltinType),
    /// A class-shaped type described by a schema.
    Class(Arc<Schema>),
    /// A context object.
    Context(ContextKind),
}

impl ParamType {
    /// Returns `true` for builtin types.
    #[must_use]
    pub const fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }

    /// Returns the builtin type, if any.
    #[must_use]
    pub const fn builtin(&self) -> Option<BuiltinType> {
        match self {
            Self::Builtin(ty) => Some(*ty),
            _ => None,
        }
    }

    /// Type name used in error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(ty) => ty.name(),
            Self::Class(schema) => schema.title().unwrap_or("object"),
            Self::Context(kind) => kind.well_known_name(),
        }
    }
}

/// Marks a parameter as injected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectSpec {
    /// Injectable name, when it differs from the parameter name.
    pub name: Option<String>,
}

/// A declared handler parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    name: String,
    types: Vec<ParamType>,
    default: Option<Value>,
    nullable: bool,
    sources: Vec<Source>,
    alias: Option<String>,
    inject: Option<InjectSpec>,
}

impl ParamSpec {
    /// Creates an untyped parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            default: None,
            nullable: false,
            sources: Vec::new(),
            alias: None,
            inject: None,
        }
    }

    /// Adds a member to the declared type. Calling it twice declares a union.
    #[must_use]
    pub fn ty(mut self, ty: ParamType) -> Self {
        self.types.push(ty);
        self
    }

    /// Adds a builtin type member.
    #[must_use]
    pub fn builtin(self, ty: BuiltinType) -> Self {
        self.ty(ParamType::Builtin(ty))
    }

    /// Declares an `int` parameter.
    #[must_use]
    pub fn int(self) -> Self {
        self.builtin(BuiltinType::Int)
    }

    /// Declares a `float` parameter.
    #[must_use]
    pub fn float(self) -> Self {
        self.builtin(BuiltinType::Float)
    }

    /// Declares a `bool` parameter.
    #[must_use]
    pub fn bool(self) -> Self {
        self.builtin(BuiltinType::Bool)
    }

    /// Declares a `string` parameter.
    #[must_use]
    pub fn string(self) -> Self {
        self.builtin(BuiltinType::String)
    }

    /// Declares an `array` parameter.
    #[must_use]
    pub fn array(self) -> Self {
        self.builtin(BuiltinType::Array)
    }

    /// Declares an `object` parameter.
    #[must_use]
    pub fn object(self) -> Self {
        self.builtin(BuiltinType::Object)
    }

    /// Declares a class-shaped parameter.
    #[must_use]
    pub fn class(self, schema: impl Into<Arc<Schema>>) -> Self {
        self.ty(ParamType::Class(schema.into()))
    }

    /// Declares a context-object parameter.
    #[must_use]
    pub fn context(self, kind: ContextKind) -> Self {
        self.ty(ParamType::Context(kind))
    }

    /// Sets a default, making the parameter optional.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Accepts `null`, making the parameter optional.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Adds a source. Later sources override earlier ones.
    #[must_use]
    pub fn from(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    /// Looks the parameter up under another name.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Injects the registered injectable with the parameter's own name.
    #[must_use]
    pub fn inject(mut self) -> Self {
        self.inject = Some(InjectSpec::default());
        self
    }

    /// Injects the registered injectable called `name`.
    #[must_use]
    pub fn inject_as(mut self, name: impl Into<String>) -> Self {
        self.inject = Some(InjectSpec {
            name: Some(name.into()),
        });
        self
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type members, in order. Empty means untyped.
    #[must_use]
    pub fn types(&self) -> &[ParamType] {
        &self.types
    }

    /// Declared default value.
    #[must_use]
    pub const fn declared_default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether `null` is accepted.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether a missing value is acceptable.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.default.is_some() || self.nullable
    }

    /// Declared sources.
    #[must_use]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Explicit alias.
    #[must_use]
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Inject marker.
    #[must_use]
    pub const fn injection(&self) -> Option<&InjectSpec> {
        self.inject.as_ref()
    }

    /// Name of the injectable to resolve, if injected.
    #[must_use]
    pub fn injectable_name(&self) -> Option<&str> {
        self.inject
            .as_ref()
            .map(|inject| inject.name.as_deref().unwrap_or(&self.name))
    }

    /// Returns `true` when untyped or typed with a single builtin.
    #[must_use]
    pub fn is_keyed(&self) -> bool {
        match self.types.as_slice() {
            [] => true,
            [only] => only.is_builtin(),
            _ => false,
        }
    }

    /// The single context kind this parameter is typed with, if any.
    #[must_use]
    pub fn context_kind(&self) -> Option<ContextKind> {
        match self.types.as_slice() {
            [ParamType::Context(kind)] => Some(*kind),
            _ => None,
        }
    }
}

/// Immutable description of a handler's parameters.
#[derive(Clone, PartialEq)]
pub struct HandlerDescriptor {
    name: String,
    params: Vec<ParamSpec>,
    alias_generator: Option<AliasGenerator>,
}

impl HandlerDescriptor {
    /// Creates a descriptor with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            alias_generator: None,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Renames every parameter that has no explicit alias.
    #[must_use]
    pub fn alias_generator(mut self, generator: AliasGenerator) -> Self {
        self.alias_generator = Some(generator);
        self
    }

    /// Handler name, for logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Parameter at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ParamSpec> {
        self.params.get(index)
    }

    /// Number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Index of the first parameter whose lookup name is `name`.
    #[must_use]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        (0..self.params.len()).find(|&index| self.alias_for(index) == name)
    }

    /// Name the parameter at `index` is looked up under.
    ///
    /// An explicit alias wins, then the alias generator, then the plain name.
    #[must_use]
    pub fn alias_for(&self, index: usize) -> String {
        let Some(param) = self.params.get(index) else {
            return String::new();
        };
        if let Some(alias) = param.alias_name() {
            return alias.to_string();
        }
        match &self.alias_generator {
            Some(generator) => generator.apply(param.name()),
            None => param.name().to_string(),
        }
    }

    /// Parameter names in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name().to_string()).collect()
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field("params", &self.params.iter().map(ParamSpec::name).collect::<Vec<_>>())
            .field("alias_generator", &self.alias_generator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alias_precedence() {
        let descriptor = HandlerDescriptor::new("handler")
            .alias_generator(AliasGenerator::Camel)
            .param(ParamSpec::new("post_id").int().alias("id"))
            .param(ParamSpec::new("all_posts").array());

        assert_eq!(descriptor.alias_for(0), "id");
        assert_eq!(descriptor.alias_for(1), "allPosts");
        assert_eq!(descriptor.position_of("allPosts"), Some(1));
    }

    #[test]
    fn test_injectable_name() {
        let plain = ParamSpec::new("post").inject();
        let named = ParamSpec::new("greeting").inject_as("hello_world");
        assert_eq!(plain.injectable_name(), Some("post"));
        assert_eq!(named.injectable_name(), Some("hello_world"));
        assert_eq!(ParamSpec::new("x").injectable_name(), None);
    }

    #[test]
    fn test_optional_and_keyed() {
        let param = ParamSpec::new("limit").int().default_value(json!(10));
        assert!(param.is_optional());
        assert!(param.is_keyed());

        let union = ParamSpec::new("post").int().class(Schema::object(vec![]));
        assert!(!union.is_keyed());
        assert!(!union.is_optional());
    }
}
