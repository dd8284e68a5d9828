//! Exception handlers keyed by exception class.

use indexmap::IndexMap;

use fastpoint_core::ExceptionClass;
use fastpoint_di::Handler;

/// Exception class to handler.
///
/// Classes are keyed by their whole lineage, so two classes sharing a name
/// under different parents get separate entries. Lookup tries the thrown
/// class first, then each ancestor, nearest first.
#[derive(Debug, Clone, Default)]
pub struct ExceptionHandlerTable {
    handlers: IndexMap<ExceptionClass, Handler>,
}

impl ExceptionHandlerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `class`.
    ///
    /// An existing handler is only replaced when `override_existing` is set.
    /// Returns `true` if the handler was stored.
    pub fn insert(&mut self, class: &ExceptionClass, handler: Handler, override_existing: bool) -> bool {
        if !override_existing && self.handlers.contains_key(class) {
            return false;
        }
        self.handlers.insert(class.clone(), handler);
        true
    }

    /// Finds the handler for `class`, returning it with the class it was registered for.
    #[must_use]
    pub fn find(&self, class: &ExceptionClass) -> Option<(&str, &Handler)> {
        class.lineage().find_map(|ancestor| {
            self.handlers
                .get_key_value(ancestor)
                .map(|(class, handler)| (class.name(), handler))
        })
    }

    /// Copies every handler of `parent` whose class has no handler here.
    pub fn merge_missing(&mut self, parent: &Self) {
        for (class, handler) in &parent.handlers {
            if !self.handlers.contains_key(class) {
                self.handlers.insert(class.clone(), handler.clone());
            }
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
