//! Runtime error types.

use thiserror::Error;

use herald_core::{AdapterError, DispatchError};

/// Errors raised by the runtime orchestration layer.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration loading or extraction failed.
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    /// The adapter failed while running or closing.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// A dispatch failed in a way the robot could not isolate.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Internal runtime error.
    #[error("runtime error: {0}")]
    Internal(String),
}

impl RuntimeError {
    /// Creates an internal runtime error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
