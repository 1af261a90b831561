//! Response facade for listener callbacks.
//!
//! A [`Response`] is the thin per-message object a callback uses to talk
//! back: [`send`](Response::send) addresses the room, [`reply`](Response::reply)
//! addresses the user. Both run the robot's response-phase middleware chain
//! before delegating to the adapter, so extensions can rewrite or suppress
//! outgoing text without the callback knowing.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::foundation::error::DispatchResult;
use crate::foundation::message::{Envelope, Message};
use crate::framework::middleware::MiddlewareChain;
use crate::integration::adapter::BoxedAdapter;

/// How an outgoing payload should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMethod {
    /// Send to the room.
    Send,
    /// Reply, addressed at the originating user.
    Reply,
    /// Change the room topic.
    Topic,
}

/// An outgoing payload travelling through the response middleware chain.
///
/// The strings are behind a mutex so middleware entries can rewrite them in
/// place; envelope and method are fixed at creation.
pub struct Outgoing {
    envelope: Envelope,
    method: SendMethod,
    strings: Mutex<Vec<String>>,
}

impl Outgoing {
    /// Creates an outgoing payload.
    pub fn new(envelope: Envelope, method: SendMethod, strings: Vec<String>) -> Self {
        Self {
            envelope,
            method,
            strings: Mutex::new(strings),
        }
    }

    /// Returns the addressing information.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Returns the delivery method.
    pub fn method(&self) -> SendMethod {
        self.method
    }

    /// Returns a snapshot of the text payloads.
    pub fn strings(&self) -> Vec<String> {
        self.strings.lock().clone()
    }

    /// Replaces the text payloads.
    pub fn set_strings(&self, strings: Vec<String>) {
        *self.strings.lock() = strings;
    }
}

impl std::fmt::Debug for Outgoing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outgoing")
            .field("method", &self.method)
            .field("room", &self.envelope.room)
            .field("strings", &self.strings.lock().len())
            .finish()
    }
}

/// The per-message send/reply facade handed to listener callbacks.
pub struct Response {
    message: Message,
    adapter: BoxedAdapter,
    middleware: MiddlewareChain<Arc<Outgoing>>,
}

impl Response {
    /// Creates a response facade for one inbound message.
    ///
    /// The middleware chain is a snapshot of the robot's response chain;
    /// chains are append-only at setup time, so the snapshot is complete.
    pub fn new(
        message: Message,
        adapter: BoxedAdapter,
        middleware: MiddlewareChain<Arc<Outgoing>>,
    ) -> Self {
        Self {
            message,
            adapter,
            middleware,
        }
    }

    /// Returns the inbound message this response belongs to.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Returns the addressing information of the inbound message.
    pub fn envelope(&self) -> &Envelope {
        self.message.envelope()
    }

    /// Sends text payloads to the room the message came from.
    pub async fn send(&self, strings: &[&str]) -> DispatchResult<()> {
        self.deliver(SendMethod::Send, strings).await
    }

    /// Replies to the user the message came from.
    pub async fn reply(&self, strings: &[&str]) -> DispatchResult<()> {
        self.deliver(SendMethod::Reply, strings).await
    }

    /// Sets the topic of the room the message came from.
    pub async fn topic(&self, strings: &[&str]) -> DispatchResult<()> {
        self.deliver(SendMethod::Topic, strings).await
    }

    async fn deliver(&self, method: SendMethod, strings: &[&str]) -> DispatchResult<()> {
        let outgoing = Arc::new(Outgoing::new(
            self.message.envelope().clone(),
            method,
            strings.iter().map(|s| s.to_string()).collect(),
        ));

        if !self.middleware.execute(Arc::clone(&outgoing)).await? {
            debug!(?method, "response middleware suppressed outgoing message");
            return Ok(());
        }

        let strings = outgoing.strings();
        let envelope = outgoing.envelope();
        match method {
            SendMethod::Send => self.adapter.send(envelope, &strings).await?,
            SendMethod::Reply => self.adapter.reply(envelope, &strings).await?,
            SendMethod::Topic => self.adapter.topic(envelope, &strings).await?,
        }
        Ok(())
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("message", &self.message.kind())
            .field("adapter", &self.adapter.name())
            .finish()
    }
}
