//! Error channel and lifecycle observers.
//!
//! Herald replaces a generic named-event bus with two explicit observer
//! registries so the contract stays statically checkable: the
//! [`ErrorChannel`] for dispatch failures and [`LifecycleHooks`] for the
//! ready signal.
//!
//! The error channel is a pure observer: it is the only path by which
//! per-listener failures become visible, and it never halts or resumes
//! dispatch. Control flow belongs entirely to the dispatcher.

use tracing::{error, warn};

use crate::foundation::context::Context;
use crate::foundation::error::DispatchError;

/// A registered error handler.
///
/// Handlers receive the error and, when the failure happened inside a
/// dispatch, the context of the message being processed. A handler may itself
/// fail; that failure is logged and swallowed, never propagated.
pub type ErrorHandler =
    Box<dyn Fn(&DispatchError, Option<&Context>) -> Result<(), DispatchError> + Send + Sync>;

/// Ordered registry of error handlers.
#[derive(Default)]
pub struct ErrorChannel {
    handlers: Vec<ErrorHandler>,
}

impl ErrorChannel {
    /// Creates a new channel with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error handler. Handlers run in registration order.
    pub fn register<F>(&mut self, handler: F)
    where
        F: Fn(&DispatchError, Option<&Context>) -> Result<(), DispatchError>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Logs an error and broadcasts it to every handler in order.
    pub fn report(&self, err: &DispatchError, ctx: Option<&Context>) {
        error!(error = %err, detail = ?err, "dispatch error");

        for handler in &self.handlers {
            if let Err(handler_err) = handler(err, ctx) {
                warn!(error = %handler_err, "error handler failed");
            }
        }
    }
}

impl std::fmt::Debug for ErrorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// A registered ready callback.
pub type ReadyHandler = Box<dyn Fn() + Send + Sync>;

/// Lifecycle observers, fired at explicit call sites by the runtime.
#[derive(Default)]
pub struct LifecycleHooks {
    ready: Vec<ReadyHandler>,
}

impl LifecycleHooks {
    /// Creates an empty set of hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for the ready signal.
    pub fn on_ready<F>(&mut self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.ready.push(Box::new(f));
    }

    /// Invokes every ready callback in registration order.
    pub fn fire_ready(&self) {
        for handler in &self.ready {
            handler();
        }
    }
}

impl std::fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("ready", &self.ready.len())
            .finish()
    }
}
