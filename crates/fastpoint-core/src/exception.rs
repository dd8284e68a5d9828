//! Exceptions thrown by handler bodies.
//!
//! Handlers signal unexpected failures by returning `Err(Exception)`. Every
//! exception belongs to an [`ExceptionClass`]; classes form a single-inheritance
//! hierarchy rooted at [`BASE_EXCEPTION`], which is what exception handler tables
//! walk to find the nearest registered ancestor.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use thiserror::Error;

use crate::value::ArgumentError;

/// Name of the root exception class.
pub const BASE_EXCEPTION: &str = "Exception";

struct ClassNode {
    name: String,
    parent: Option<ExceptionClass>,
}

/// A named exception type with an optional parent.
///
/// # Example
///
/// ```
/// use fastpoint_core::ExceptionClass;
///
/// let custom = ExceptionClass::new("CustomException");
/// let not_found = custom.extend("PostNotFound");
///
/// let names: Vec<_> = not_found.lineage().map(|c| c.name().to_string()).collect();
/// assert_eq!(names, ["PostNotFound", "CustomException", "Exception"]);
/// ```
#[derive(Clone)]
pub struct ExceptionClass(Arc<ClassNode>);

impl ExceptionClass {
    /// Returns the root class every other class descends from.
    #[must_use]
    pub fn base() -> Self {
        Self(Arc::new(ClassNode {
            name: BASE_EXCEPTION.to_string(),
            parent: None,
        }))
    }

    /// Creates a direct subclass of the root class.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::base().extend(name)
    }

    /// Creates a subclass of `self`.
    #[must_use]
    pub fn extend(&self, name: impl Into<String>) -> Self {
        Self(Arc::new(ClassNode {
            name: name.into(),
            parent: Some(self.clone()),
        }))
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the parent class, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&ExceptionClass> {
        self.0.parent.as_ref()
    }

    /// Iterates over this class followed by each ancestor, nearest first.
    pub fn lineage(&self) -> impl Iterator<Item = &ExceptionClass> {
        std::iter::successors(Some(self), |class| class.parent())
    }

    /// Returns `true` if this class is `name` or descends from it.
    #[must_use]
    pub fn is_a(&self, name: &str) -> bool {
        self.lineage().any(|class| class.name() == name)
    }
}

impl PartialEq for ExceptionClass {
    fn eq(&self, other: &Self) -> bool {
        self.lineage()
            .map(ExceptionClass::name)
            .eq(other.lineage().map(ExceptionClass::name))
    }
}

impl Eq for ExceptionClass {}

impl Hash for ExceptionClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for class in self.lineage() {
            class.name().hash(state);
        }
    }
}

impl fmt::Debug for ExceptionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExceptionClass").field(&self.name()).finish()
    }
}

impl fmt::Display for ExceptionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failure raised by a handler body.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Exception {
    class: ExceptionClass,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

impl Exception {
    /// Creates an exception of the root class.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::of(&ExceptionClass::base(), message)
    }

    /// Creates an exception of the given class.
    #[must_use]
    pub fn of(class: &ExceptionClass, message: impl Into<String>) -> Self {
        Self {
            class: class.clone(),
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the exception class.
    #[must_use]
    pub fn class(&self) -> &ExceptionClass {
        &self.class
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for Exception {
    fn from(error: anyhow::Error) -> Self {
        Self::new(error.to_string()).with_source(error)
    }
}

impl From<ArgumentError> for Exception {
    fn from(error: ArgumentError) -> Self {
        Self::of(&ExceptionClass::new("ArgumentError"), error.to_string()).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_class_has_no_parent() {
        let base = ExceptionClass::base();
        assert_eq!(base.name(), BASE_EXCEPTION);
        assert!(base.parent().is_none());
    }

    #[test]
    fn test_is_a_walks_ancestors() {
        let custom = ExceptionClass::new("CustomException");
        let nested = custom.extend("NestedException");
        assert!(nested.is_a("NestedException"));
        assert!(nested.is_a("CustomException"));
        assert!(nested.is_a(BASE_EXCEPTION));
        assert!(!custom.is_a("NestedException"));
    }

    #[test]
    fn test_classes_compare_by_lineage() {
        assert_eq!(ExceptionClass::new("A"), ExceptionClass::new("A"));
        assert_ne!(
            ExceptionClass::new("A"),
            ExceptionClass::new("B").extend("A")
        );
    }

    #[test]
    fn test_exception_from_anyhow_keeps_source() {
        let exception = Exception::from(anyhow::anyhow!("disk full"));
        assert_eq!(exception.message(), "disk full");
        assert_eq!(exception.class().name(), BASE_EXCEPTION);
        assert!(std::error::Error::source(&exception).is_some());
    }
}
