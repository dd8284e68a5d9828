//! Argument slots shared by the resolver stages.

use fastpoint_core::{Arg, Arguments, FieldError, ResolutionError};
use fastpoint_extract::HandlerDescriptor;

/// Argument slots filled so far, one per declared parameter.
#[derive(Debug, Clone)]
pub struct ResolvedArguments {
    slots: Vec<Option<Arg>>,
}

impl ResolvedArguments {
    /// Creates `arity` empty slots.
    #[must_use]
    pub fn new(arity: usize) -> Self {
        Self {
            slots: vec![None; arity],
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the handler takes no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` once slot `index` holds a value.
    #[must_use]
    pub fn is_resolved(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(Option::is_some)
    }

    /// Indices still waiting for a value, in order.
    #[must_use]
    pub fn unresolved(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.is_none().then_some(index))
            .collect()
    }

    /// Returns `true` when every slot holds a value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Stores `arg` in slot `index`. Filled slots are never overwritten.
    pub fn fill(&mut self, index: usize, arg: Arg) {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.is_none() {
                *slot = Some(arg);
            }
        }
    }

    /// The value in slot `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Turns the slots into an argument list.
    ///
    /// Empty slots take the declared default, then `null` for nullable
    /// parameters. Anything still empty is reported as a missing argument.
    pub fn into_arguments(self, descriptor: &HandlerDescriptor) -> Result<Arguments, ResolutionError> {
        let mut values = Vec::with_capacity(self.slots.len());
        let mut errors = Vec::new();

        for (index, slot) in self.slots.into_iter().enumerate() {
            if let Some(arg) = slot {
                values.push(arg);
                continue;
            }
            let param = descriptor.get(index);
            if let Some(default) = param.and_then(|p| p.declared_default()) {
                values.push(Arg::Value(default.clone()));
            } else if param.is_some_and(|p| p.is_nullable()) {
                values.push(Arg::null());
            } else {
                errors.push(FieldError::missing(descriptor.alias_for(index)));
            }
        }

        if !errors.is_empty() {
            return Err(ResolutionError::InvalidData { errors });
        }
        Ok(Arguments::new(descriptor.names(), values))
    }
}
