//! Integration layer - external system interfaces.
//!
//! The dispatch core talks to the outside world through exactly two seams:
//! the [`Adapter`] trait on the way in and out of a chat backend, and the
//! [`Response`] facade listener callbacks use to send and reply.

pub mod adapter;
pub mod response;

pub use adapter::{Adapter, BoxedAdapter};
pub use response::{Outgoing, Response, SendMethod};
