//! # Herald Core
//!
//! The message-dispatch core of the Herald chat automation framework.
//!
//! Herald receives normalized chat events from an adapter and routes them, in
//! a well-defined order, through a chain of listeners, each optionally
//! producing a response.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! - **Message model**: normalized inbound events ([`Message`], [`Envelope`])
//! - **Context**: per-dispatch state ([`Context`], [`PatternMatch`])
//! - **Errors**: the failure taxonomy ([`DispatchError`], [`AdapterError`])
//!
//! ### Framework Layer
//!
//! - **Pattern compiler**: directed-at-me matching ([`respond_pattern`])
//! - **Middleware**: phase interceptors ([`MiddlewareChain`])
//! - **Listeners**: matcher + callback pairs ([`Listener`], [`ListenerRegistry`])
//! - **Dispatch core**: the receive pipeline ([`Robot`])
//! - **Error channel**: failure observers ([`ErrorChannel`])
//!
//! ### Integration Layer
//!
//! - **Adapter boundary**: chat-backend seam ([`Adapter`])
//! - **Response facade**: send/reply for callbacks ([`Response`])
//!
//! ## Dispatch Pipeline
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌───────────────────────────┐
//! │   Adapter   │────▶│ receive chain   │────▶│ Listener 1 (middleware +  │
//! │  (inbound)  │     │ (gate)          │────▶│ Listener 2  callback)     │
//! └─────────────┘     └─────────────────┘────▶│ ...        ─▶ Response    │
//!                                             └───────────────────────────┘
//!                                          unmatched? one catch-all pass
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use herald_core::{Message, Robot};
//! use std::sync::Arc;
//!
//! let mut robot = Robot::new("hal", Some("computer".into()), adapter);
//!
//! robot.respond("(?i)open the (.*) doors", Default::default(), |ctx| async move {
//!     let what = ctx.matched().unwrap().get(1).unwrap().to_string();
//!     ctx.response().reply(&[&format!("I'm afraid I can't open the {what} doors")]).await
//! })?;
//!
//! robot.receive(message).await?;
//! ```

// Architectural layers
pub mod foundation;
pub mod framework;
pub mod integration;

// Re-export foundation types
pub use foundation::{
    AdapterError, AdapterResult, Context, DispatchError, DispatchResult, Envelope, Message,
    PatternError, PatternMatch, PatternResult, User,
};

// Re-export framework types
pub use framework::{
    Dispatch, ErrorChannel, Listener, ListenerContext, ListenerOptions, ListenerRegistry,
    ListenerResult, MatchOutcome, MiddlewareChain, Robot, respond_pattern,
};

// Re-export integration types
pub use integration::{Adapter, BoxedAdapter, Outgoing, Response, SendMethod};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::framework::{
        Dispatch, ErrorChannel, Listener, ListenerContext, ListenerOptions, ListenerResult,
        MatchOutcome, MiddlewareChain, Robot, respond_pattern,
    };
    pub use super::integration::{Adapter, BoxedAdapter, Response, SendMethod};
}
