//! Framework layer - the dispatch pipeline.
//!
//! This module contains the receive/dispatch machinery:
//! - Respond-pattern compilation for directed-at-me listeners
//! - Middleware chains with sequential, short-circuiting execution
//! - The listener system and its ordered registry
//! - The [`Robot`] dispatch core tying it all together
//! - The error channel and lifecycle observers

pub mod events;
pub mod listener;
pub mod middleware;
pub mod pattern;
pub mod registry;
pub mod robot;

pub use events::{ErrorChannel, ErrorHandler, LifecycleHooks, ReadyHandler};
pub use listener::{
    CallbackFn, Listener, ListenerContext, ListenerOptions, MatchOutcome, PredicateFn,
};
pub use middleware::{MiddlewareChain, MiddlewareFn};
pub use pattern::respond_pattern;
pub use registry::ListenerRegistry;
pub use robot::{Dispatch, ListenerResult, Robot};
