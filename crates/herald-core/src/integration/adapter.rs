//! Adapter boundary for the Herald framework.
//!
//! An adapter connects the dispatch core to a concrete chat backend. The core
//! never prescribes a transport: it hands the adapter an envelope and text
//! payloads and treats the result as opaque. On the inbound side the adapter
//! normalizes backend events into [`Message`] values and pushes them through
//! the channel given to [`Adapter::run`].

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::foundation::error::{AdapterError, AdapterResult};
use crate::foundation::message::{Envelope, Message};

/// A chat-backend adapter.
///
/// Implementations are expected to be cheap to share (`Arc<dyn Adapter>`)
/// and internally synchronized.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Returns the adapter's name (e.g. "shell", "irc").
    fn name(&self) -> &str;

    /// Delivers text payloads to the room identified by the envelope.
    async fn send(&self, envelope: &Envelope, strings: &[String]) -> AdapterResult<()>;

    /// Delivers text payloads addressed back at the envelope's user.
    async fn reply(&self, envelope: &Envelope, strings: &[String]) -> AdapterResult<()>;

    /// Changes the topic of the envelope's room.
    ///
    /// Optional; backends without topics keep the default.
    async fn topic(&self, _envelope: &Envelope, _strings: &[String]) -> AdapterResult<()> {
        Err(AdapterError::Unsupported {
            adapter: self.name().to_string(),
            operation: "topic",
        })
    }

    /// Runs the inbound event loop until the backend disconnects or the
    /// token is cancelled.
    ///
    /// Normalized messages go out through `events`; dropping the sender
    /// signals the runtime that the stream has ended.
    async fn run(
        &self,
        events: mpsc::Sender<Message>,
        shutdown: CancellationToken,
    ) -> AdapterResult<()>;

    /// Releases backend resources. Called once during shutdown.
    async fn close(&self) -> AdapterResult<()> {
        Ok(())
    }
}

/// A shared adapter trait object.
pub type BoxedAdapter = std::sync::Arc<dyn Adapter>;
