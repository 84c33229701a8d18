//! Testing utilities for Courier.
//!
//! This module provides utilities to make testing routers, handlers and
//! validators easier.
//!
//! # Features
//!
//! - [`FakeTransport`]: A transport that records posted envelopes and lets the
//!   test deliver events by hand
//! - [`RecordingHook`]: A hook that records all traffic it observes
//! - [`Probe`]: A call recorder for handlers and reply callbacks

use crate::sync::lock;
use courier_core::{
    Direction, Disposition, Envelope, Hook, Inbox, InboundEvent, Traffic, Transport, TransportError,
};
use std::sync::{Arc, Mutex};

// ============================================================================
// Fake Transport
// ============================================================================

/// A named destination in a [`FakeTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Peer(pub &'static str);

/// An envelope handed to a [`FakeTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Posted {
    /// Where it was sent.
    pub destination: Peer,
    /// What was sent.
    pub envelope: Envelope,
    /// The origin filter it was sent with.
    pub target_origin: String,
}

#[derive(Default)]
struct FakeState {
    inboxes: Vec<Inbox<Peer>>,
    posted: Vec<Posted>,
    closed: Vec<Peer>,
    fail_posts: bool,
}

/// A transport that records every post and delivers only what the test
/// hands it.
///
/// # Example
///
/// ```rust,ignore
/// let transport = FakeTransport::new();
/// let router = Router::new(transport.clone(), RouterConfig::new());
///
/// transport.deliver_envelope(&Envelope::new("init", json!({}), true), "https://shop.example", Peer("top"));
/// assert_eq!(transport.posted().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    /// Create a transport where every peer is open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every envelope posted so far.
    pub fn posted(&self) -> Vec<Posted> {
        lock(&self.state).posted.clone()
    }

    /// The most recent post.
    pub fn last_posted(&self) -> Option<Posted> {
        lock(&self.state).posted.last().cloned()
    }

    /// Drains the recorded posts.
    pub fn take_posted(&self) -> Vec<Posted> {
        std::mem::take(&mut lock(&self.state).posted)
    }

    /// Marks `peer` as unable to receive envelopes.
    pub fn close(&self, peer: Peer) {
        lock(&self.state).closed.push(peer);
    }

    /// Makes every following post fail.
    pub fn fail_posts(&self, fail: bool) {
        lock(&self.state).fail_posts = fail;
    }

    /// Number of inboxes subscribed.
    pub fn subscriptions(&self) -> usize {
        lock(&self.state).inboxes.len()
    }

    /// Delivers `event` to every subscribed inbox.
    pub fn deliver(&self, event: InboundEvent<Peer>) {
        let inboxes = lock(&self.state).inboxes.clone();
        for inbox in inboxes {
            inbox(event.clone());
        }
    }

    /// Delivers `envelope` as if posted by `source` from `origin`.
    pub fn deliver_envelope(&self, envelope: &Envelope, origin: &str, source: Peer) {
        match InboundEvent::from_envelope(envelope, origin, source) {
            Ok(event) => self.deliver(event),
            Err(err) => panic!("envelope does not encode: {err}"),
        }
    }
}

impl Transport for FakeTransport {
    type Destination = Peer;

    fn subscribe(&self, inbox: Inbox<Peer>) {
        lock(&self.state).inboxes.push(inbox);
    }

    fn can_receive(&self, destination: &Peer) -> bool {
        !lock(&self.state).closed.contains(destination)
    }

    fn post(
        &self,
        destination: &Peer,
        envelope: &Envelope,
        target_origin: &str,
    ) -> Result<(), TransportError> {
        let mut state = lock(&self.state);
        if state.fail_posts {
            return Err(TransportError::Closed(destination.0.to_owned()));
        }
        state.posted.push(Posted {
            destination: *destination,
            envelope: envelope.clone(),
            target_origin: target_origin.to_owned(),
        });
        Ok(())
    }
}

// ============================================================================
// Recording Hook
// ============================================================================

/// An owned copy of a [`Traffic`] record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    /// Sent or received.
    pub direction: Direction,
    /// The envelope subject.
    pub subject: String,
    /// The envelope correlation id.
    pub correlation_id: String,
    /// The origin the envelope came from or was addressed to.
    pub origin: String,
    /// The outcome.
    pub disposition: Disposition,
}

/// A hook that records all traffic it observes.
///
/// Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingHook {
    records: Arc<Mutex<Vec<Observed>>>,
}

impl RecordingHook {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a clone of the recorded traffic.
    pub fn records(&self) -> Vec<Observed> {
        lock(&self.records).clone()
    }

    /// The disposition of every record, in order.
    pub fn dispositions(&self) -> Vec<Disposition> {
        lock(&self.records)
            .iter()
            .map(|record| record.disposition)
            .collect()
    }

    /// Get the number of recorded envelopes.
    pub fn count(&self) -> usize {
        lock(&self.records).len()
    }

    /// Clear all records.
    pub fn clear(&self) {
        lock(&self.records).clear();
    }
}

impl Hook for RecordingHook {
    fn on_traffic(&self, traffic: &Traffic<'_>) {
        lock(&self.records).push(Observed {
            direction: traffic.direction,
            subject: traffic.subject.to_owned(),
            correlation_id: traffic.correlation_id.to_owned(),
            origin: traffic.origin.to_owned(),
            disposition: traffic.disposition,
        });
    }
}

// ============================================================================
// Probe
// ============================================================================

/// Records the values a handler or callback was called with.
///
/// # Example
///
/// ```rust,ignore
/// let probe = Probe::new();
/// let calls = probe.clone();
/// router.set_listener("echo", move |n: u32, _| {
///     calls.record(n);
///     Ok(n)
/// });
/// ```
pub struct Probe<T> {
    calls: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> Probe<T> {
    /// Create a probe with no calls.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Record one call.
    pub fn record(&self, value: T) {
        lock(&self.calls).push(value);
    }

    /// The recorded values, in call order.
    pub fn calls(&self) -> Vec<T> {
        lock(&self.calls).clone()
    }

    /// Number of calls.
    pub fn count(&self) -> usize {
        lock(&self.calls).len()
    }
}

impl<T: Clone> Default for Probe<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Probe<T> {
    fn clone(&self) -> Self {
        Self {
            calls: self.calls.clone(),
        }
    }
}
