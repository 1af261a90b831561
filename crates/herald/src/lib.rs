//! # Herald
//!
//! A message-dispatch framework for chat automation agents.
//!
//! ## Overview
//!
//! Herald routes normalized chat events through an ordered chain of
//! listeners, each optionally producing a response. Plugins are plain code
//! that registers listeners and middleware during a setup phase; the core
//! guarantees ordering, short-circuiting via the `done` flag, a single
//! catch-all fallback pass, and failure isolation between listeners.
//!
//! ```text
//! ┌─────────────┐     ┌─────────┐     ┌────────────────────────────┐
//! │   Adapter   │────▶│  Robot  │────▶│ Listener (middleware + cb) │──▶ Response
//! │  (backend)  │     │ (core)  │────▶│ Listener ...               │
//! └─────────────┘     └─────────┘     └────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), herald::runtime::RuntimeError> {
//!     let mut runtime = Runtime::new(my_adapter)?;
//!
//!     runtime.robot_mut().respond("(?i)ping", Default::default(), |ctx| async move {
//!         ctx.response().reply(&["pong"]).await
//!     })?;
//!
//!     runtime.run().await
//! }
//! ```

pub use herald_core as core;
pub use herald_runtime as runtime;

/// Prelude module for convenient imports.
pub mod prelude {
    // Runtime - main entry point
    pub use herald_runtime::{HeraldConfig, Runtime};

    // Dispatch core
    pub use herald_core::{
        Context, Dispatch, ListenerOptions, ListenerResult, Message, Robot,
    };

    // Adapter boundary
    pub use herald_core::{Adapter, AdapterError, BoxedAdapter, Envelope, User};

    // Errors plugins raise
    pub use herald_core::DispatchError;
}
