//! # Transport Port
//!
//! The bidirectional channel supplied by the hosting environment. The router
//! only consumes it: it subscribes once, asks whether a destination can
//! receive envelopes, and posts envelopes filtered by a target origin.
//!
//! Implementations decide how envelopes travel (a frame's message port, an
//! in-process queue, a socket). Delivery order is whatever the transport
//! provides; the router neither reorders nor buffers.

use crate::{envelope::Envelope, error::TransportError, event::InboundEvent};
use std::{fmt::Debug, sync::Arc};

/// The callback a transport invokes for every delivered event.
pub type Inbox<D> = Arc<dyn Fn(InboundEvent<D>) + Send + Sync>;

/// A channel delivering envelopes between isolated contexts.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Transport`",
    label = "missing `Transport` implementation",
    note = "Transports must implement `subscribe`, `can_receive` and `post`."
)]
pub trait Transport: Send + Sync + 'static {
    /// Opaque handle identifying another context. Compared by identity when
    /// matching a reply to the destination of its request.
    type Destination: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Registers the listener for inbound events.
    fn subscribe(&self, inbox: Inbox<Self::Destination>);

    /// Whether `destination` is currently able to receive envelopes.
    fn can_receive(&self, destination: &Self::Destination) -> bool;

    /// Posts `envelope` to `destination`, to be delivered only if the
    /// destination's origin matches `target_origin`.
    fn post(
        &self,
        destination: &Self::Destination,
        envelope: &Envelope,
        target_origin: &str,
    ) -> Result<(), TransportError>;
}

impl<T: Transport> Transport for Arc<T> {
    type Destination = T::Destination;

    fn subscribe(&self, inbox: Inbox<Self::Destination>) {
        (**self).subscribe(inbox)
    }

    fn can_receive(&self, destination: &Self::Destination) -> bool {
        (**self).can_receive(destination)
    }

    fn post(
        &self,
        destination: &Self::Destination,
        envelope: &Envelope,
        target_origin: &str,
    ) -> Result<(), TransportError> {
        (**self).post(destination, envelope, target_origin)
    }
}
