use std::fmt;
use std::sync::Arc;

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// Renames every parameter of a handler that has no explicit alias.
#[derive(Clone)]
pub enum AliasGenerator {
    /// `postId` becomes `post_id`.
    Snake,
    /// `post_id` becomes `postId`.
    Camel,
    /// `post_id` becomes `PostId`.
    Pascal,
    /// `postId` becomes `post-id`.
    Kebab,
    /// Any other renaming.
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl AliasGenerator {
    /// Wraps a custom renaming function.
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Applies the renaming.
    #[must_use]
    pub fn apply(&self, name: &str) -> String {
        match self {
            Self::Snake => name.to_snake_case(),
            Self::Camel => name.to_lower_camel_case(),
            Self::Pascal => name.to_upper_camel_case(),
            Self::Kebab => name.to_kebab_case(),
            Self::Custom(f) => f(name),
        }
    }
}

impl PartialEq for AliasGenerator {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Debug for AliasGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snake => f.write_str("Snake"),
            Self::Camel => f.write_str("Camel"),
            Self::Pascal => f.write_str("Pascal"),
            Self::Kebab => f.write_str("Kebab"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
