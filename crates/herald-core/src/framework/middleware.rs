//! Middleware chains for the Herald framework.
//!
//! A [`MiddlewareChain`] is an ordered list of async interceptors run at a
//! defined phase of dispatch. The robot carries three of them: the receive
//! chain (gates a whole dispatch), the listener chain (re-checked per matched
//! listener) and the response chain (runs inside the response facade before
//! the adapter call).
//!
//! # Contract
//!
//! Entries run strictly in registration order, each awaited before the next:
//!
//! - `Ok(true)` continues to the next entry
//! - `Ok(false)` halts the chain; [`execute`](MiddlewareChain::execute)
//!   returns `Ok(false)`
//! - `Err` propagates to the caller of `execute` untouched
//!
//! An empty chain resolves `Ok(true)`. There is no priority field and entries
//! are never skipped or reordered. Chains are append-only at setup time and
//! read-only during dispatch.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::foundation::error::DispatchError;

/// A type-erased middleware entry.
pub type MiddlewareFn<T> =
    Arc<dyn Fn(T) -> BoxFuture<'static, Result<bool, DispatchError>> + Send + Sync>;

/// An ordered, short-circuiting sequence of async interceptors.
///
/// Generic over the context type `T` so the same machinery backs all three
/// phases; `T` must be cheap to clone (the phases use `Arc`-based contexts).
#[derive(Clone)]
pub struct MiddlewareChain<T> {
    entries: Vec<MiddlewareFn<T>>,
}

impl<T> Default for MiddlewareChain<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Clone> MiddlewareChain<T> {
    /// Creates a new, empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor to the chain.
    pub fn register<F, Fut>(&mut self, f: F)
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, DispatchError>> + Send + 'static,
    {
        self.entries.push(Arc::new(move |ctx| Box::pin(f(ctx))));
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the chain against a context.
    ///
    /// Returns `Ok(true)` if every entry passed (or the chain is empty),
    /// `Ok(false)` as soon as one entry halts, and the first `Err` otherwise.
    pub async fn execute(&self, ctx: T) -> Result<bool, DispatchError> {
        for entry in &self.entries {
            if !entry(ctx.clone()).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<T> std::fmt::Debug for MiddlewareChain<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("entries", &self.entries.len())
            .finish()
    }
}
