//! The Herald dispatch core.
//!
//! [`Robot`] owns the listener registry, the three middleware chains and the
//! error channel, and orchestrates the receive pipeline:
//!
//! 1. Wrap the inbound [`Message`] in a fresh [`Context`]
//! 2. Gate it through the receive-phase middleware chain
//! 3. Scan listeners in registration order, re-checking each matched listener
//!    through the listener-phase chain before invoking its callback
//! 4. If nothing executed, re-dispatch once with the message wrapped as a
//!    catch-all
//!
//! # Failure Isolation
//!
//! Listeners are independently-authored, untrusted code. An error from one
//! listener's matcher, middleware pass or callback is reported through the
//! error channel and the scan moves on; a single misbehaving plugin cannot
//! block its siblings. The one deliberate exception is the receive-phase
//! chain: it runs before any listener isolation boundary exists, so its
//! errors fail the whole dispatch call.

use std::sync::Arc;

use tracing::{Instrument, Level, debug, span, trace};

use crate::foundation::context::Context;
use crate::foundation::error::{DispatchError, PatternResult};
use crate::foundation::message::Message;
use crate::framework::events::{ErrorChannel, LifecycleHooks};
use crate::framework::listener::{
    Listener, ListenerContext, ListenerOptions, MatchOutcome,
};
use crate::framework::middleware::MiddlewareChain;
use crate::framework::pattern::respond_pattern;
use crate::framework::registry::ListenerRegistry;
use crate::integration::adapter::BoxedAdapter;
use crate::integration::response::{Outgoing, Response};

/// The outcome of one top-level receive call.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The receive-phase middleware chain halted the dispatch before any
    /// listener was considered. Distinct from "nothing matched".
    Halted,
    /// The listener scan ran; one result per executed listener, in scan
    /// order.
    Completed(Vec<ListenerResult>),
}

/// The recorded result of one executed listener.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerResult {
    /// The callback ran to completion.
    Done,
    /// The listener-phase chain or the callback failed; already reported
    /// through the error channel.
    Failed,
    /// The listener-phase chain halted before the callback.
    Skipped,
    /// The results of the catch-all pass, nested as a single entry.
    Fallback(Vec<ListenerResult>),
}

/// The message-dispatch core of a Herald agent.
///
/// Registration methods take `&mut self` and belong to the setup phase;
/// [`receive`](Self::receive) takes `&self`, so registries are read-only
/// while dispatch is live. The host may run multiple `receive` calls
/// concurrently; each is internally sequential.
pub struct Robot {
    name: String,
    alias: Option<String>,
    adapter: BoxedAdapter,
    listeners: ListenerRegistry,
    receive_middleware: MiddlewareChain<Arc<Context>>,
    listener_middleware: MiddlewareChain<ListenerContext>,
    response_middleware: MiddlewareChain<Arc<Outgoing>>,
    errors: ErrorChannel,
    lifecycle: LifecycleHooks,
}

impl Robot {
    /// Creates a robot with the given identity and adapter.
    pub fn new(name: impl Into<String>, alias: Option<String>, adapter: BoxedAdapter) -> Self {
        Self {
            name: name.into(),
            alias,
            adapter,
            listeners: ListenerRegistry::new(),
            receive_middleware: MiddlewareChain::new(),
            listener_middleware: MiddlewareChain::new(),
            response_middleware: MiddlewareChain::new(),
            errors: ErrorChannel::new(),
            lifecycle: LifecycleHooks::new(),
        }
    }

    /// Returns the agent's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the agent's alias, if configured.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns the adapter this robot sends through.
    pub fn adapter(&self) -> &BoxedAdapter {
        &self.adapter
    }

    /// Returns the error channel, for reporting failures that happen outside
    /// a dispatch (e.g. in the runtime's event loop).
    pub fn errors(&self) -> &ErrorChannel {
        &self.errors
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // ========================================================================
    // Registration API (setup phase)
    // ========================================================================

    /// Registers a listener with an arbitrary matcher predicate.
    pub fn listen<M, F, Fut>(&mut self, matcher: M, options: ListenerOptions, callback: F)
    where
        M: Fn(&Message) -> Result<bool, DispatchError> + Send + Sync + 'static,
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        self.listeners.add(Listener::new(matcher, options, callback));
    }

    /// Registers a pattern listener that fires on any matching message body.
    pub fn hear<F, Fut>(&mut self, pattern: regex::Regex, options: ListenerOptions, callback: F)
    where
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        self.listeners
            .add(Listener::with_pattern(pattern, options, callback));
    }

    /// Registers a pattern listener that only fires when the agent is
    /// addressed directly.
    ///
    /// The pattern matches the remainder of the utterance after the address;
    /// see [`respond_pattern`] for the composition rules.
    pub fn respond<F, Fut>(
        &mut self,
        pattern: &str,
        options: ListenerOptions,
        callback: F,
    ) -> PatternResult<()>
    where
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        let compiled = respond_pattern(pattern, &self.name, self.alias.as_deref())?;
        self.listeners
            .add(Listener::with_pattern(compiled, options, callback));
        Ok(())
    }

    /// Registers a listener for room-enter events.
    pub fn enter<F, Fut>(&mut self, options: ListenerOptions, callback: F)
    where
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        self.listen(
            |msg| Ok(matches!(msg, Message::Enter { .. })),
            options,
            callback,
        );
    }

    /// Registers a listener for room-leave events.
    pub fn leave<F, Fut>(&mut self, options: ListenerOptions, callback: F)
    where
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        self.listen(
            |msg| Ok(matches!(msg, Message::Leave { .. })),
            options,
            callback,
        );
    }

    /// Registers a listener for topic-change events.
    pub fn topic<F, Fut>(&mut self, options: ListenerOptions, callback: F)
    where
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        self.listen(
            |msg| Ok(matches!(msg, Message::Topic { .. })),
            options,
            callback,
        );
    }

    /// Registers a fallback listener, fired only during the catch-all pass.
    pub fn catch_all<F, Fut>(&mut self, options: ListenerOptions, callback: F)
    where
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        self.listen(|msg| Ok(msg.is_catch_all()), options, callback);
    }

    /// Appends an interceptor to the receive-phase chain.
    pub fn receive_middleware<F, Fut>(&mut self, f: F)
    where
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<bool, DispatchError>> + Send + 'static,
    {
        self.receive_middleware.register(f);
    }

    /// Appends an interceptor to the listener-phase chain.
    pub fn listener_middleware<F, Fut>(&mut self, f: F)
    where
        F: Fn(ListenerContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<bool, DispatchError>> + Send + 'static,
    {
        self.listener_middleware.register(f);
    }

    /// Appends an interceptor to the response-phase chain.
    pub fn response_middleware<F, Fut>(&mut self, f: F)
    where
        F: Fn(Arc<Outgoing>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<bool, DispatchError>> + Send + 'static,
    {
        self.response_middleware.register(f);
    }

    /// Appends a handler to the error channel.
    pub fn on_error<F>(&mut self, handler: F)
    where
        F: Fn(&DispatchError, Option<&Context>) -> Result<(), DispatchError>
            + Send
            + Sync
            + 'static,
    {
        self.errors.register(handler);
    }

    /// Registers a callback for the ready signal.
    pub fn on_ready<F>(&mut self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.lifecycle.on_ready(f);
    }

    /// Fires the ready signal. Called by the runtime once the adapter is up.
    pub fn fire_ready(&self) {
        self.lifecycle.fire_ready();
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Dispatches one inbound message through the full pipeline.
    ///
    /// Returns [`Dispatch::Halted`] when the receive-phase chain stops the
    /// message, otherwise the ordered per-listener results; a catch-all pass,
    /// if one ran, appears as a single nested
    /// [`ListenerResult::Fallback`] entry.
    ///
    /// # Errors
    ///
    /// Only receive-phase middleware failures surface here. Everything that
    /// goes wrong inside the listener scan, including the catch-all pass, is
    /// reported through the error channel instead.
    pub async fn receive(&self, message: Message) -> Result<Dispatch, DispatchError> {
        let span = span!(Level::DEBUG, "receive", kind = message.kind());
        self.dispatch(message).instrument(span).await
    }

    async fn dispatch(&self, message: Message) -> Result<Dispatch, DispatchError> {
        let response = Response::new(
            message,
            Arc::clone(&self.adapter),
            self.response_middleware.clone(),
        );
        let ctx = Arc::new(Context::new(response));

        if !self.receive_middleware.execute(Arc::clone(&ctx)).await? {
            debug!("receive middleware halted dispatch");
            return Ok(Dispatch::Halted);
        }

        let mut results = Vec::new();
        let mut executed = false;

        for listener in self.listeners.iter() {
            let outcome = match listener.try_match(ctx.message()) {
                Ok(outcome) => outcome,
                Err(err) => {
                    let err = DispatchError::Matcher {
                        listener: listener.id().unwrap_or("unnamed").to_string(),
                        reason: err.to_string(),
                    };
                    self.errors.report(&err, Some(&ctx));
                    continue;
                }
            };

            match outcome {
                MatchOutcome::NoMatch => continue,
                MatchOutcome::Matched => ctx.set_match(None),
                MatchOutcome::Captured(matched) => ctx.set_match(Some(matched)),
            }

            trace!(
                listener = listener.id().unwrap_or("unnamed"),
                "listener matched"
            );
            executed = true;
            results.push(self.run_listener(listener, &ctx).await);

            if ctx.is_done() {
                debug!("message marked done, stopping listener scan");
                break;
            }
        }

        if !executed && !ctx.message().is_catch_all() {
            debug!("no listener executed, retrying as catch-all");
            let fallback = Message::catch_all(ctx.message().clone());
            // Recursion is capped at one level: the fallback message is a
            // catch-all and can never be wrapped again.
            match Box::pin(self.dispatch(fallback)).await {
                Ok(Dispatch::Completed(nested)) => results.push(ListenerResult::Fallback(nested)),
                Ok(Dispatch::Halted) => results.push(ListenerResult::Fallback(Vec::new())),
                Err(err) => self.errors.report(&err, Some(&ctx)),
            }
        }

        Ok(Dispatch::Completed(results))
    }

    /// Runs one matched listener: its middleware pass, then its callback.
    ///
    /// Never returns an error; failures are reported and folded into the
    /// recorded result so the scan continues.
    async fn run_listener(&self, listener: &Listener, ctx: &Arc<Context>) -> ListenerResult {
        let listener_ctx = ListenerContext {
            context: Arc::clone(ctx),
            options: listener.options_arc(),
        };

        match self.listener_middleware.execute(listener_ctx).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(
                    listener = listener.id().unwrap_or("unnamed"),
                    "listener middleware halted callback"
                );
                return ListenerResult::Skipped;
            }
            Err(err) => {
                self.errors.report(&err, Some(ctx));
                return ListenerResult::Failed;
            }
        }

        match (listener.callback())(Arc::clone(ctx)).await {
            Ok(()) => ListenerResult::Done,
            Err(err) => {
                let err = DispatchError::Listener {
                    listener: listener.id().unwrap_or("unnamed").to_string(),
                    reason: err.to_string(),
                };
                self.errors.report(&err, Some(ctx));
                ListenerResult::Failed
            }
        }
    }
}

impl std::fmt::Debug for Robot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Robot")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("adapter", &self.adapter.name())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::error::AdapterResult;
    use crate::foundation::message::{Envelope, User};
    use crate::integration::adapter::Adapter;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    struct NullAdapter;

    #[async_trait]
    impl Adapter for NullAdapter {
        fn name(&self) -> &str {
            "null"
        }

        async fn send(&self, _envelope: &Envelope, _strings: &[String]) -> AdapterResult<()> {
            Ok(())
        }

        async fn reply(&self, _envelope: &Envelope, _strings: &[String]) -> AdapterResult<()> {
            Ok(())
        }

        async fn run(
            &self,
            _events: mpsc::Sender<Message>,
            _shutdown: CancellationToken,
        ) -> AdapterResult<()> {
            Ok(())
        }
    }

    fn robot() -> Robot {
        Robot::new("hal", None, Arc::new(NullAdapter))
    }

    fn text(body: &str) -> Message {
        Message::text(Envelope::new(User::new("1", "alice"), "general"), body)
    }

    fn options(id: &str) -> ListenerOptions {
        ListenerOptions::from([("id".to_string(), Value::from(id))])
    }

    fn counting_callback(
        counter: &Arc<AtomicUsize>,
    ) -> impl Fn(Arc<Context>) -> futures::future::BoxFuture<'static, Result<(), DispatchError>>
    + use<> {
        let counter = Arc::clone(counter);
        move |_| {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_all_matching_listeners_run_without_done() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut robot = robot();
        robot.listen(|_| Ok(true), options("a"), counting_callback(&counter));
        robot.listen(|_| Ok(true), options("b"), counting_callback(&counter));

        let dispatch = robot.receive(text("hi")).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(
            dispatch,
            Dispatch::Completed(vec![ListenerResult::Done, ListenerResult::Done])
        );
    }

    #[tokio::test]
    async fn test_done_stops_later_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut robot = robot();

        robot.listen(
            |_| Ok(true),
            options("finisher"),
            |ctx: Arc<Context>| async move {
                ctx.finish();
                Ok(())
            },
        );
        robot.listen(|_| Ok(true), options("late"), counting_callback(&counter));

        let dispatch = robot.receive(text("hi")).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(dispatch, Dispatch::Completed(vec![ListenerResult::Done]));
    }

    #[tokio::test]
    async fn test_unmatched_message_runs_exactly_one_catch_all_pass() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut robot = robot();
        robot.catch_all(options("fallback"), counting_callback(&counter));

        let dispatch = robot.receive(text("nobody hears this")).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(
            dispatch,
            Dispatch::Completed(vec![ListenerResult::Fallback(vec![ListenerResult::Done])])
        );
    }

    #[tokio::test]
    async fn test_catch_all_message_never_falls_back_again() {
        let robot = robot();

        // No listeners at all: the catch-all pass matches nothing either,
        // and must not trigger a second-level fallback.
        let dispatch = robot.receive(text("hi")).await.unwrap();
        assert_eq!(
            dispatch,
            Dispatch::Completed(vec![ListenerResult::Fallback(Vec::new())])
        );

        // Feeding an already-wrapped message gives no fallback entry at all.
        let dispatch = robot.receive(Message::catch_all(text("hi"))).await.unwrap();
        assert_eq!(dispatch, Dispatch::Completed(Vec::new()));
    }

    #[tokio::test]
    async fn test_matched_listener_suppresses_catch_all() {
        let counter = Arc::new(AtomicUsize::new(0));
        let fallback_counter = Arc::new(AtomicUsize::new(0));
        let mut robot = robot();
        robot.listen(|_| Ok(true), options("direct"), counting_callback(&counter));
        robot.catch_all(options("fallback"), counting_callback(&fallback_counter));

        robot.receive(text("hi")).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_receive_middleware_false_short_circuits() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut robot = robot();
        robot.receive_middleware(|_| async { Ok(false) });
        robot.listen(|_| Ok(true), options("a"), counting_callback(&counter));

        let dispatch = robot.receive(text("hi")).await.unwrap();
        assert_eq!(dispatch, Dispatch::Halted);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_receive_middleware_error_fails_dispatch() {
        let mut robot = robot();
        robot.receive_middleware(|_| async { Err(DispatchError::middleware("auth down")) });

        assert!(robot.receive(text("hi")).await.is_err());
    }

    #[tokio::test]
    async fn test_callback_error_does_not_stop_scan() {
        let counter = Arc::new(AtomicUsize::new(0));
        let reported = Arc::new(AtomicUsize::new(0));
        let mut robot = robot();

        let r = Arc::clone(&reported);
        robot.on_error(move |_, ctx| {
            assert!(ctx.is_some());
            r.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        robot.listen(
            |_| Ok(true),
            options("broken"),
            |_| async { Err(DispatchError::other("plugin exploded")) },
        );
        robot.listen(|_| Ok(true), options("healthy"), counting_callback(&counter));

        let dispatch = robot.receive(text("hi")).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(reported.load(Ordering::SeqCst), 1);
        assert_eq!(
            dispatch,
            Dispatch::Completed(vec![ListenerResult::Failed, ListenerResult::Done])
        );
    }

    #[tokio::test]
    async fn test_matcher_error_does_not_stop_scan() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut robot = robot();

        robot.listen(
            |_| Err(DispatchError::other("bad matcher")),
            options("broken"),
            |_| async { Ok(()) },
        );
        robot.listen(|_| Ok(true), options("healthy"), counting_callback(&counter));

        let dispatch = robot.receive(text("hi")).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        // The failed matcher never executed, so only one result is recorded.
        assert_eq!(dispatch, Dispatch::Completed(vec![ListenerResult::Done]));
    }

    #[tokio::test]
    async fn test_listener_middleware_halts_callback_but_counts_as_executed() {
        let counter = Arc::new(AtomicUsize::new(0));
        let fallback_counter = Arc::new(AtomicUsize::new(0));
        let mut robot = robot();

        robot.listener_middleware(|lctx: ListenerContext| async move {
            Ok(lctx.listener_id() != Some("blocked"))
        });
        robot.listen(|_| Ok(true), options("blocked"), counting_callback(&counter));
        robot.catch_all(options("fallback"), counting_callback(&fallback_counter));

        let dispatch = robot.receive(text("hi")).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        // The listener matched, so the catch-all pass does not run.
        assert_eq!(fallback_counter.load(Ordering::SeqCst), 0);
        assert_eq!(dispatch, Dispatch::Completed(vec![ListenerResult::Skipped]));
    }

    #[tokio::test]
    async fn test_respond_listener_sees_captures() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut robot = robot();

        let s = Arc::clone(&seen);
        robot
            .respond("(?i)open the (.*) doors", options("doors"), move |ctx| {
                let s = Arc::clone(&s);
                async move {
                    let matched = ctx.matched().expect("pattern listener sets captures");
                    s.lock().push(matched.get(1).unwrap().to_string());
                    Ok(())
                }
            })
            .unwrap();

        robot.receive(text("hal: open the pod bay doors")).await.unwrap();
        assert_eq!(*seen.lock(), vec!["pod bay"]);

        // Without a direct address, the pattern must not fire.
        let dispatch = robot.receive(text("open the pod bay doors")).await.unwrap();
        assert_eq!(
            dispatch,
            Dispatch::Completed(vec![ListenerResult::Fallback(Vec::new())])
        );
    }

    #[tokio::test]
    async fn test_predicate_listener_clears_stale_captures() {
        let saw_captures = Arc::new(AtomicUsize::new(0));
        let mut robot = robot();

        robot.hear(
            regex::Regex::new("(hi)").unwrap(),
            options("pattern"),
            |_| async { Ok(()) },
        );

        let s = Arc::clone(&saw_captures);
        robot.listen(
            |msg| Ok(msg.body() == Some("hi")),
            options("predicate"),
            move |ctx| {
                let s = Arc::clone(&s);
                async move {
                    if ctx.matched().is_some() {
                        s.fetch_add(1, Ordering::SeqCst);
                    }
                    Ok(())
                }
            },
        );

        robot.receive(text("hi")).await.unwrap();
        assert_eq!(saw_captures.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_error_is_reported_not_raised() {
        let reported = Arc::new(AtomicUsize::new(0));
        let mut robot = robot();

        let r = Arc::clone(&reported);
        robot.on_error(move |_, _| {
            r.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        // Fails only for the catch-all pass, i.e. inside the fallback
        // dispatch's own receive-middleware gate.
        robot.receive_middleware(|ctx: Arc<Context>| async move {
            if ctx.message().is_catch_all() {
                Err(DispatchError::middleware("fallback gate broke"))
            } else {
                Ok(true)
            }
        });

        let dispatch = robot.receive(text("hi")).await.unwrap();
        assert_eq!(dispatch, Dispatch::Completed(Vec::new()));
        assert_eq!(reported.load(Ordering::SeqCst), 1);
    }
}
