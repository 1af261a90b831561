//! Listener system for the Herald framework.
//!
//! A [`Listener`] pairs a matcher with an async callback and an opaque options
//! map. Matchers are a closed tagged enum rather than an open trait: a
//! *predicate* listener runs an arbitrary (fallible) check against the
//! message, and a *pattern* listener matches a compiled regular expression
//! against the message body and extracts capture groups.
//!
//! Both variants answer through the uniform
//! [`try_match`](Listener::try_match), which the dispatcher calls for every
//! listener in registration order.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use regex::Regex;
use serde_json::Value;

use crate::foundation::context::{Context, PatternMatch};
use crate::foundation::error::DispatchError;
use crate::foundation::message::Message;

/// Free-form listener configuration, keyed by extension name.
///
/// The dispatch core never interprets these values; they are passed through
/// to listener middleware untouched. The conventional `"id"` key names the
/// listener in logs and error reports.
pub type ListenerOptions = HashMap<String, Value>;

/// A type-erased predicate matcher.
pub type PredicateFn = Arc<dyn Fn(&Message) -> Result<bool, DispatchError> + Send + Sync>;

/// A type-erased listener callback.
pub type CallbackFn =
    Arc<dyn Fn(Arc<Context>) -> BoxFuture<'static, Result<(), DispatchError>> + Send + Sync>;

/// The outcome of evaluating a matcher against a message.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// The matcher did not match; the dispatcher moves on with no side
    /// effects.
    NoMatch,
    /// A predicate matcher matched.
    Matched,
    /// A pattern matcher matched, with capture groups.
    Captured(PatternMatch),
}

impl MatchOutcome {
    /// Returns `true` for [`Matched`](Self::Matched) and
    /// [`Captured`](Self::Captured).
    pub fn is_match(&self) -> bool {
        !matches!(self, Self::NoMatch)
    }
}

/// The matcher half of a listener.
#[derive(Clone)]
enum Matcher {
    /// An arbitrary predicate over the message.
    Predicate(PredicateFn),
    /// A compiled regular expression over the message body.
    Pattern(Regex),
}

/// A registered (matcher, options, callback) triple.
///
/// Listeners are immutable once built and owned exclusively by the registry.
#[derive(Clone)]
pub struct Listener {
    matcher: Matcher,
    options: Arc<ListenerOptions>,
    callback: CallbackFn,
}

impl Listener {
    /// Creates a predicate listener.
    pub fn new<M, F, Fut>(matcher: M, options: ListenerOptions, callback: F) -> Self
    where
        M: Fn(&Message) -> Result<bool, DispatchError> + Send + Sync + 'static,
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        Self {
            matcher: Matcher::Predicate(Arc::new(matcher)),
            options: Arc::new(options),
            callback: into_callback(callback),
        }
    }

    /// Creates a pattern listener from a compiled regular expression.
    pub fn with_pattern<F, Fut>(pattern: Regex, options: ListenerOptions, callback: F) -> Self
    where
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        Self {
            matcher: Matcher::Pattern(pattern),
            options: Arc::new(options),
            callback: into_callback(callback),
        }
    }

    /// Returns the listener's id from its options, if one was configured.
    pub fn id(&self) -> Option<&str> {
        self.options.get("id").and_then(Value::as_str)
    }

    /// Returns the listener's options map.
    pub fn options(&self) -> &ListenerOptions {
        &self.options
    }

    /// Returns a shared handle to the options, for listener middleware.
    pub(crate) fn options_arc(&self) -> Arc<ListenerOptions> {
        Arc::clone(&self.options)
    }

    /// Returns the callback for the dispatcher to invoke.
    pub(crate) fn callback(&self) -> &CallbackFn {
        &self.callback
    }

    /// Evaluates this listener's matcher against a message.
    ///
    /// A pattern listener only ever matches variants that carry a body, so it
    /// never fires on `Enter`/`Leave` events or during a catch-all pass. A
    /// predicate's error is returned to the dispatcher, which reports it and
    /// continues the scan.
    pub fn try_match(&self, message: &Message) -> Result<MatchOutcome, DispatchError> {
        match &self.matcher {
            Matcher::Predicate(check) => Ok(if check(message)? {
                MatchOutcome::Matched
            } else {
                MatchOutcome::NoMatch
            }),
            Matcher::Pattern(pattern) => {
                let Some(body) = message.body() else {
                    return Ok(MatchOutcome::NoMatch);
                };
                match pattern.captures(body) {
                    Some(caps) => Ok(MatchOutcome::Captured(to_pattern_match(pattern, &caps))),
                    None => Ok(MatchOutcome::NoMatch),
                }
            }
        }
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.matcher {
            Matcher::Predicate(_) => "predicate",
            Matcher::Pattern(re) => re.as_str(),
        };
        f.debug_struct("Listener")
            .field("matcher", &kind)
            .field("id", &self.id())
            .finish()
    }
}

/// The context handed to listener-phase middleware.
///
/// Carries the dispatch context plus the matched listener's options, so
/// extensions can make per-listener decisions (rate limits, ACLs) without the
/// core interpreting the options itself.
#[derive(Clone)]
pub struct ListenerContext {
    /// The dispatch context.
    pub context: Arc<Context>,
    /// The matched listener's options.
    pub options: Arc<ListenerOptions>,
}

impl ListenerContext {
    /// Returns the listener id from the options, if configured.
    pub fn listener_id(&self) -> Option<&str> {
        self.options.get("id").and_then(Value::as_str)
    }
}

fn into_callback<F, Fut>(f: F) -> CallbackFn
where
    F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), DispatchError>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

fn to_pattern_match(pattern: &Regex, caps: &regex::Captures<'_>) -> PatternMatch {
    let groups = caps
        .iter()
        .map(|g| g.map(|m| m.as_str().to_string()))
        .collect();
    let mut named = HashMap::new();
    for name in pattern.capture_names().flatten() {
        if let Some(m) = caps.name(name) {
            named.insert(name.to_string(), m.as_str().to_string());
        }
    }
    PatternMatch::new(groups, named)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::message::{Envelope, User};

    fn text(body: &str) -> Message {
        Message::text(Envelope::new(User::new("1", "alice"), "general"), body)
    }

    #[test]
    fn test_predicate_listener_matches() {
        let listener = Listener::new(
            |msg| Ok(matches!(msg, Message::Text { .. })),
            ListenerOptions::new(),
            |_| async { Ok(()) },
        );
        assert!(listener.try_match(&text("hi")).unwrap().is_match());
        assert!(
            !listener
                .try_match(&Message::catch_all(text("hi")))
                .unwrap()
                .is_match()
        );
    }

    #[test]
    fn test_predicate_error_surfaces() {
        let listener = Listener::new(
            |_| Err(DispatchError::other("broken matcher")),
            ListenerOptions::new(),
            |_| async { Ok(()) },
        );
        assert!(listener.try_match(&text("hi")).is_err());
    }

    #[test]
    fn test_pattern_listener_extracts_captures() {
        let listener = Listener::with_pattern(
            Regex::new(r"open (?P<what>\w+)").unwrap(),
            ListenerOptions::new(),
            |_| async { Ok(()) },
        );

        let outcome = listener.try_match(&text("open doors")).unwrap();
        match outcome {
            MatchOutcome::Captured(m) => {
                assert_eq!(m.full(), "open doors");
                assert_eq!(m.get(1), Some("doors"));
                assert_eq!(m.name("what"), Some("doors"));
            }
            other => panic!("expected captures, got {other:?}"),
        }
    }

    #[test]
    fn test_pattern_listener_ignores_bodyless_messages() {
        let listener = Listener::with_pattern(
            Regex::new(".*").unwrap(),
            ListenerOptions::new(),
            |_| async { Ok(()) },
        );

        let enter = Message::Enter {
            envelope: Envelope::new(User::new("1", "alice"), "general"),
        };
        assert!(!listener.try_match(&enter).unwrap().is_match());
        assert!(
            !listener
                .try_match(&Message::catch_all(text("hi")))
                .unwrap()
                .is_match()
        );
    }

    #[test]
    fn test_listener_id_from_options() {
        let options = ListenerOptions::from([("id".to_string(), Value::from("greeter"))]);
        let listener = Listener::new(|_| Ok(true), options, |_| async { Ok(()) });
        assert_eq!(listener.id(), Some("greeter"));
    }
}
