//! Positional handler registry.

use std::fmt;

use super::handler::Handler;

/// Wire type of the handler identifier sent first on every connection.
pub type Identifier = u32;

/// Width of the identifier on the wire, in bytes.
pub const IDENTIFIER_WIDTH: usize = std::mem::size_of::<Identifier>();

/// Immutable, ordered list of handlers. A handler's index is its wire
/// identifier, so entries are never reordered or removed once built.
pub struct DispatchTable {
    handlers: Box<[Box<dyn Handler>]>,
}

impl DispatchTable {
    /// Builds a table; `handlers[i]` answers identifier `i`.
    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self {
            handlers: handlers.into_boxed_slice(),
        }
    }

    /// Looks up the handler for `identifier`.
    pub fn get(&self, identifier: Identifier) -> Option<&dyn Handler> {
        let index = usize::try_from(identifier).ok()?;
        self.handlers.get(index).map(|handler| &**handler)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// `true` when no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handler names in identifier order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.iter().map(|handler| handler.name())
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.names()).finish()
    }
}
