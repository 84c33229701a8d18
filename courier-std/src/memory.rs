//! # In-Process Transport
//!
//! A [`MemoryHub`] connects any number of simulated contexts living in one
//! process. Each context gets a [`MemoryPort`], a [`Transport`] whose
//! destinations are the [`ContextId`]s of its peers.
//!
//! Posting only queues the envelope; nothing is delivered until the hub is
//! pumped with [`MemoryHub::deliver_next`] or [`MemoryHub::run_until_idle`].
//! Delivery happens outside the hub lock, so handlers may post while being
//! delivered to. Like a browser's message channel, an envelope whose target
//! origin does not match the receiving context is dropped silently.

use crate::sync::lock;
use courier_core::{Envelope, Inbox, InboundEvent, Transport, TransportError};
use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Mutex},
};

/// Wildcard target origin.
pub const ANY_ORIGIN: &str = "*";

/// Identifies one context attached to a [`MemoryHub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context#{}", self.0)
    }
}

struct Context {
    id: ContextId,
    origin: String,
    inbox: Option<Inbox<ContextId>>,
    closed: bool,
}

struct Queued {
    target: ContextId,
    event: InboundEvent<ContextId>,
}

#[derive(Default)]
struct HubState {
    contexts: Vec<Context>,
    queue: VecDeque<Queued>,
    next_id: u64,
}

impl HubState {
    fn context(&self, id: ContextId) -> Option<&Context> {
        self.contexts.iter().find(|context| context.id == id)
    }

    fn context_mut(&mut self, id: ContextId) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|context| context.id == id)
    }
}

/// An in-process switchboard between simulated contexts.
///
/// # Example
///
/// ```rust,ignore
/// let hub = MemoryHub::new();
/// let shop = Router::new(hub.context("https://shop.example"), RouterConfig::new());
/// let frame = Router::new(hub.context("https://pay.example"), RouterConfig::new());
///
/// shop.set_destination(frame.transport().id(), "https://pay.example");
/// shop.send("init", &json!({}))?;
/// hub.run_until_idle();
/// ```
#[derive(Clone, Default)]
pub struct MemoryHub {
    state: Arc<Mutex<HubState>>,
}

impl MemoryHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a new context served from `origin`.
    pub fn context(&self, origin: impl Into<String>) -> MemoryPort {
        let mut state = lock(&self.state);
        let id = ContextId(state.next_id);
        state.next_id += 1;
        state.contexts.push(Context {
            id,
            origin: origin.into(),
            inbox: None,
            closed: false,
        });
        MemoryPort {
            id,
            hub: self.clone(),
        }
    }

    /// Closes a context. Later posts to it fail and queued envelopes for it
    /// are discarded on delivery.
    pub fn close(&self, id: ContextId) {
        if let Some(context) = lock(&self.state).context_mut(id) {
            context.closed = true;
        }
    }

    /// Number of envelopes waiting for delivery.
    pub fn pending(&self) -> usize {
        lock(&self.state).queue.len()
    }

    /// Delivers the oldest queued envelope. Returns `false` when the queue
    /// is empty.
    pub fn deliver_next(&self) -> bool {
        let (inbox, event) = {
            let mut state = lock(&self.state);
            let Some(Queued { target, event }) = state.queue.pop_front() else {
                return false;
            };
            let inbox = state
                .context(target)
                .filter(|context| !context.closed)
                .and_then(|context| context.inbox.clone());
            (inbox, event)
        };

        match inbox {
            Some(inbox) => inbox(event),
            None => tracing::trace!(source = %event.source, "envelope for unreachable context discarded"),
        }
        true
    }

    /// Delivers until the queue is empty, including envelopes posted during
    /// delivery. Returns how many were delivered.
    pub fn run_until_idle(&self) -> usize {
        let mut delivered = 0;
        while self.deliver_next() {
            delivered += 1;
        }
        delivered
    }
}

impl fmt::Debug for MemoryHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("MemoryHub")
            .field("contexts", &state.contexts.len())
            .field("pending", &state.queue.len())
            .finish()
    }
}

/// One context's end of a [`MemoryHub`].
#[derive(Clone)]
pub struct MemoryPort {
    id: ContextId,
    hub: MemoryHub,
}

impl MemoryPort {
    /// This context's id, used by peers as a destination.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The origin this context is served from.
    pub fn origin(&self) -> String {
        lock(&self.hub.state)
            .context(self.id)
            .map(|context| context.origin.clone())
            .unwrap_or_default()
    }

    /// The hub this port belongs to.
    pub fn hub(&self) -> &MemoryHub {
        &self.hub
    }
}

impl fmt::Debug for MemoryPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPort").field("id", &self.id).finish()
    }
}

impl Transport for MemoryPort {
    type Destination = ContextId;

    fn subscribe(&self, inbox: Inbox<ContextId>) {
        if let Some(context) = lock(&self.hub.state).context_mut(self.id) {
            context.inbox = Some(inbox);
        }
    }

    fn can_receive(&self, destination: &ContextId) -> bool {
        lock(&self.hub.state)
            .context(*destination)
            .is_some_and(|context| !context.closed)
    }

    fn post(
        &self,
        destination: &ContextId,
        envelope: &Envelope,
        target_origin: &str,
    ) -> Result<(), TransportError> {
        let data = envelope.to_value().map_err(TransportError::Encode)?;

        let mut state = lock(&self.hub.state);
        let sender_origin = state
            .context(self.id)
            .map(|context| context.origin.clone())
            .unwrap_or_default();
        let Some(target) = state.context(*destination).filter(|context| !context.closed) else {
            return Err(TransportError::Closed(destination.to_string()));
        };

        if target_origin != ANY_ORIGIN && target_origin != target.origin {
            tracing::debug!(
                destination = %destination,
                target_origin = %target_origin,
                actual_origin = %target.origin,
                "origin mismatch; envelope dropped"
            );
            return Ok(());
        }

        state.queue.push_back(Queued {
            target: *destination,
            event: InboundEvent::new(data, sender_origin, self.id),
        });
        Ok(())
    }
}
