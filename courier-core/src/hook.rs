//! # Traffic Hooks
//!
//! Observers of the envelopes a router sends and receives. When debug logging
//! is enabled the router reports every envelope to its hooks as a [`Traffic`]
//! record; hooks cannot alter dispatch.
//!
//! The stock logging hook renders records through `tracing`; tests attach a
//! recording hook and assert on the [`Disposition`] of each record.

use std::fmt;

/// Whether an envelope left or reached this context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Posted through the transport.
    Sent,
    /// Delivered by the transport.
    Received,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Sent => "sent",
            Direction::Received => "received",
        })
    }
}

/// What happened to an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Handed to the transport.
    Delivered,
    /// Passed validation and reached a handler.
    Accepted,
    /// Failed validation.
    Rejected,
    /// Passed validation but no handler is registered for the subject.
    NoHandler,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Disposition::Delivered => "delivered",
            Disposition::Accepted => "accepted",
            Disposition::Rejected => "rejected",
            Disposition::NoHandler => "no-handler",
        })
    }
}

/// A single observed envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traffic<'a> {
    /// Sent or received.
    pub direction: Direction,
    /// The envelope subject.
    pub subject: &'a str,
    /// The envelope correlation id.
    pub correlation_id: &'a str,
    /// The origin the envelope came from or was addressed to.
    pub origin: &'a str,
    /// The outcome.
    pub disposition: Disposition,
}

/// An observer of router traffic.
pub trait Hook: Send + Sync + 'static {
    /// Called once per observed envelope.
    fn on_traffic(&self, traffic: &Traffic<'_>);
}

impl<F> Hook for F
where
    F: Fn(&Traffic<'_>) + Send + Sync + 'static,
{
    fn on_traffic(&self, traffic: &Traffic<'_>) {
        (self)(traffic)
    }
}
