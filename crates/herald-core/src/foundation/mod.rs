//! Foundation layer - core data types.
//!
//! This module contains the types everything else is built on: the normalized
//! message model, the per-dispatch context, and the error taxonomy.

pub mod context;
pub mod error;
pub mod message;

pub use context::{Context, PatternMatch};
pub use error::{
    AdapterError, AdapterResult, DispatchError, DispatchResult, PatternError, PatternResult,
};
pub use message::{Envelope, Message, User};
