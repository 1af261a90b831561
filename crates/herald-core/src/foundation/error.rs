//! Unified error types for the Herald core.
//!
//! The taxonomy follows the failure-isolation design of the dispatcher:
//! matcher and listener failures are caught per-listener and reported through
//! the error channel, while receive-middleware failures propagate out of the
//! dispatch call because they happen before the isolation boundary exists.

use thiserror::Error;

// =============================================================================
// Pattern Errors
// =============================================================================

/// Errors from the respond-pattern compiler.
#[derive(Debug, Clone, Error)]
pub enum PatternError {
    /// The composed pattern is not a valid regular expression.
    #[error("invalid respond pattern: {0}")]
    Invalid(#[from] regex::Error),
}

// =============================================================================
// Adapter Errors
// =============================================================================

/// Errors that can occur at the adapter boundary.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// Message delivery failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// The adapter does not implement an optional operation.
    #[error("operation '{operation}' not supported by adapter '{adapter}'")]
    Unsupported {
        /// The adapter name.
        adapter: String,
        /// The unsupported operation.
        operation: &'static str,
    },

    /// The adapter connection has been closed.
    #[error("adapter closed: {0}")]
    Closed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AdapterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors raised while dispatching a message.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// A middleware entry failed.
    #[error("middleware failed: {0}")]
    Middleware(String),

    /// A listener's matcher failed while being evaluated.
    #[error("matcher failed for listener '{listener}': {reason}")]
    Matcher {
        /// The listener id, or "unnamed".
        listener: String,
        /// Reason for failure.
        reason: String,
    },

    /// A listener's callback failed.
    #[error("listener '{listener}' failed: {reason}")]
    Listener {
        /// The listener id, or "unnamed".
        listener: String,
        /// Reason for failure.
        reason: String,
    },

    /// Adapter error surfaced through the response facade.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// A respond pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Free-form error from plugin code.
    #[error("{0}")]
    Other(String),
}

impl DispatchError {
    /// Creates a free-form dispatch error, for use by plugin callbacks.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Creates a middleware error.
    pub fn middleware(msg: impl Into<String>) -> Self {
        Self::Middleware(msg.into())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Result type for pattern compilation.
pub type PatternResult<T> = Result<T, PatternError>;

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
