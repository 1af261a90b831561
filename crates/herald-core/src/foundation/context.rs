//! Per-dispatch context for the Herald framework.
//!
//! This module provides [`Context`], the transient object created for each
//! top-level `receive` call. It bundles the inbound [`Message`] (via the
//! [`Response`] facade) with the two pieces of mutable per-dispatch state:
//! the `done` flag and the match captures of the most recent pattern listener.
//!
//! Both are deliberately the *only* mutation channels available to listener
//! callbacks; everything else the dispatch core hands out is read-only.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::foundation::message::Message;
use crate::integration::response::Response;

/// Captures extracted by a pattern listener for the current dispatch.
///
/// Group 0 is always the full match; positional groups keep their original
/// numbering, so `get(1)` is the first explicit capture group.
#[derive(Debug, Clone, Default)]
pub struct PatternMatch {
    groups: Vec<Option<String>>,
    named: HashMap<String, String>,
}

impl PatternMatch {
    /// Creates a match record from raw capture text.
    pub fn new(groups: Vec<Option<String>>, named: HashMap<String, String>) -> Self {
        Self { groups, named }
    }

    /// Returns the full matched text.
    pub fn full(&self) -> &str {
        self.groups
            .first()
            .and_then(|g| g.as_deref())
            .unwrap_or_default()
    }

    /// Returns the text of positional capture group `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }

    /// Returns the text of the named capture group `name`.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    /// Returns the number of capture groups, including group 0.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if no groups were captured.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// The context object passed to middleware and listener callbacks.
///
/// A `Context` is created fresh for every top-level
/// [`Robot::receive`](crate::framework::robot::Robot::receive) call and shared
/// across the scan as an `Arc`. It is never persisted beyond the dispatch.
///
/// # The `done` Flag
///
/// Calling [`finish`](Self::finish) marks the message as handled: the
/// dispatcher stops the listener scan after the current listener completes.
/// It does not cancel anything already in flight.
pub struct Context {
    /// The response facade, which owns the inbound message.
    response: Response,
    /// Whether the message has been marked as fully handled.
    done: AtomicBool,
    /// Captures set by whichever pattern listener matched most recently.
    matched: Mutex<Option<PatternMatch>>,
}

impl Context {
    /// Creates a new context around a response facade.
    pub fn new(response: Response) -> Self {
        Self {
            response,
            done: AtomicBool::new(false),
            matched: Mutex::new(None),
        }
    }

    /// Returns the inbound message being dispatched.
    pub fn message(&self) -> &Message {
        self.response.message()
    }

    /// Returns the response facade for sending and replying.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Marks the message as handled, stopping the scan after the current
    /// listener.
    pub fn finish(&self) {
        self.done.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if the message has been marked as handled.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Replaces the match captures for the listener about to run.
    ///
    /// The dispatcher calls this before every matched listener so that a
    /// predicate listener never observes a previous pattern listener's
    /// captures.
    pub fn set_match(&self, matched: Option<PatternMatch>) {
        *self.matched.lock() = matched;
    }

    /// Returns the captures of the pattern that matched, if any.
    pub fn matched(&self) -> Option<PatternMatch> {
        self.matched.lock().clone()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("message", &self.message().kind())
            .field("done", &self.is_done())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_match_groups() {
        let m = PatternMatch::new(
            vec![Some("open 42".into()), Some("42".into()), None],
            HashMap::from([("id".to_string(), "42".to_string())]),
        );
        assert_eq!(m.full(), "open 42");
        assert_eq!(m.get(1), Some("42"));
        assert_eq!(m.get(2), None);
        assert_eq!(m.name("id"), Some("42"));
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn test_empty_pattern_match() {
        let m = PatternMatch::default();
        assert!(m.is_empty());
        assert_eq!(m.full(), "");
        assert_eq!(m.get(0), None);
    }
}
