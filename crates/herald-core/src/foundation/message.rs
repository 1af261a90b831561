//! Message model for the Herald framework.
//!
//! Every inbound chat event is normalized by an adapter into one of the
//! [`Message`] variants before it enters the dispatch pipeline. The model is
//! deliberately a closed enum: listeners match against it with exhaustive
//! patterns and the dispatch core can reason about the catch-all wrapping
//! invariant statically.
//!
//! # Catch-All Wrapping
//!
//! When no listener matches a message, the dispatch core re-offers it to
//! fallback listeners wrapped in [`Message::CatchAll`]. A catch-all message is
//! never wrapped a second time; [`Message::catch_all`] is idempotent and the
//! dispatcher checks [`Message::is_catch_all`] before recursing.

use serde::{Deserialize, Serialize};

/// The identity of a chat participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Platform-specific unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl User {
    /// Creates a new user.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Addressing information paired with outbound text when sending or replying.
///
/// The envelope identifies where a message came from and, symmetrically,
/// where a response should go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// The user the event originated from.
    pub user: User,
    /// The room the event originated in.
    pub room: String,
}

impl Envelope {
    /// Creates a new envelope.
    pub fn new(user: User, room: impl Into<String>) -> Self {
        Self {
            user,
            room: room.into(),
        }
    }
}

/// A normalized inbound chat event.
///
/// Constructed by an adapter at the transport boundary and handed to
/// [`Robot::receive`](crate::framework::robot::Robot::receive). The dispatch
/// core and listener callbacks treat it as read-only; per-dispatch mutable
/// state (the `done` flag and match captures) lives on the
/// [`Context`](crate::foundation::context::Context) instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    /// A chat message with text content.
    Text {
        /// Sender and room.
        envelope: Envelope,
        /// The message text.
        text: String,
    },
    /// A user entered a room.
    Enter {
        /// Sender and room.
        envelope: Envelope,
    },
    /// A user left a room.
    Leave {
        /// Sender and room.
        envelope: Envelope,
    },
    /// The topic of a room changed.
    Topic {
        /// Sender and room.
        envelope: Envelope,
        /// The new topic text.
        text: String,
    },
    /// A previously unmatched message, re-offered to fallback listeners.
    CatchAll {
        /// The original message.
        inner: Box<Message>,
    },
}

impl Message {
    /// Creates a text message.
    pub fn text(envelope: Envelope, text: impl Into<String>) -> Self {
        Self::Text {
            envelope,
            text: text.into(),
        }
    }

    /// Wraps a message for the fallback pass.
    ///
    /// Idempotent: a message that is already a catch-all is returned
    /// unchanged rather than being wrapped a second time.
    pub fn catch_all(message: Message) -> Self {
        match message {
            already @ Self::CatchAll { .. } => already,
            other => Self::CatchAll {
                inner: Box::new(other),
            },
        }
    }

    /// Returns the envelope of this message.
    ///
    /// For a catch-all this is the envelope of the wrapped message, so
    /// fallback listeners can still reply to the original sender.
    pub fn envelope(&self) -> &Envelope {
        match self {
            Self::Text { envelope, .. }
            | Self::Enter { envelope }
            | Self::Leave { envelope }
            | Self::Topic { envelope, .. } => envelope,
            Self::CatchAll { inner } => inner.envelope(),
        }
    }

    /// Returns the text content, if this variant carries any.
    ///
    /// A catch-all deliberately returns `None` even when it wraps a text
    /// message: pattern listeners must not re-match during the fallback pass.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } | Self::Topic { text, .. } => Some(text),
            Self::Enter { .. } | Self::Leave { .. } | Self::CatchAll { .. } => None,
        }
    }

    /// Returns the wrapped message of a catch-all, or the message itself.
    pub fn unwrapped(&self) -> &Message {
        match self {
            Self::CatchAll { inner } => inner,
            other => other,
        }
    }

    /// Returns `true` if this message is a catch-all wrapper.
    pub fn is_catch_all(&self) -> bool {
        matches!(self, Self::CatchAll { .. })
    }

    /// Returns a short name for the message variant, used in log spans.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Enter { .. } => "enter",
            Self::Leave { .. } => "leave",
            Self::Topic { .. } => "topic",
            Self::CatchAll { .. } => "catch_all",
        }
    }
}
