//! Ordered listener registry.
//!
//! The registry is an append-only list: listeners are tried in registration
//! order for every message, and nothing reorders or removes them. Mutation
//! happens only during the setup phase; during dispatch the registry is read
//! exclusively.

use crate::framework::listener::Listener;

/// The ordered collection of registered listeners.
#[derive(Debug, Default, Clone)]
pub struct ListenerRegistry {
    listeners: Vec<Listener>,
}

impl ListenerRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener. Registration order is scan order.
    pub fn add(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Iterates listeners in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Listener> {
        self.listeners.iter()
    }
}
