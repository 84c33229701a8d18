//! One-shot reply correlation.
//!
//! Sending with a reply callback registers a [`ReplyListener`] under the
//! envelope's correlation id. The listener fires at most once, and only for
//! an event whose source is the destination the request was sent to. The
//! origin of the reply is not checked.

use crate::sync::lock;
use courier_core::{CorrelationId, Exception, InboundEvent, ReplyError};
use futures::{FutureExt, channel::oneshot};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::Mutex,
    task::{Context, Poll},
};

/// A reply delivered to the side that sent a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<D> {
    /// The reply content: the remote handler's output, or an exception descriptor.
    pub content: Value,
    /// Origin of the replying context.
    pub origin: String,
    /// Handle to the replying context.
    pub source: D,
}

impl<D> Reply<D> {
    /// Returns the remote failure if the content has the exception shape.
    pub fn exception(&self) -> Option<Exception> {
        Exception::detect(&self.content)
    }

    /// Decodes the content, turning a remote exception into an error.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ReplyError> {
        if let Some(exception) = self.exception() {
            return Err(ReplyError::Exception(exception.exception));
        }
        serde_json::from_value(self.content.clone()).map_err(ReplyError::Decode)
    }
}

/// Callback invoked with the correlated reply.
pub type ReplyCallback<D> = Box<dyn FnOnce(Reply<D>) + Send>;

/// A transient listener registered under a correlation id.
pub struct ReplyListener<D> {
    expected_source: D,
    callback: Mutex<Option<ReplyCallback<D>>>,
}

impl<D> ReplyListener<D> {
    pub(crate) fn new(expected_source: D, callback: ReplyCallback<D>) -> Self {
        Self {
            expected_source,
            callback: Mutex::new(Some(callback)),
        }
    }

    /// The destination the request was sent to.
    pub fn expected_source(&self) -> &D {
        &self.expected_source
    }

    /// Whether the listener already fired.
    pub fn is_spent(&self) -> bool {
        lock(&self.callback).is_none()
    }
}

impl<D: Clone + PartialEq> ReplyListener<D> {
    pub(crate) fn matches(&self, event: &InboundEvent<D>) -> bool {
        event.source == self.expected_source
    }

    /// Hands the reply to the callback. Returns `false` if it already fired.
    pub(crate) fn fire(&self, content: Value, event: &InboundEvent<D>) -> bool {
        let Some(callback) = lock(&self.callback).take() else {
            return false;
        };
        callback(Reply {
            content,
            origin: event.origin.clone(),
            source: event.source.clone(),
        });
        true
    }
}

impl<D: fmt::Debug> fmt::Debug for ReplyListener<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyListener")
            .field("expected_source", &self.expected_source)
            .field("spent", &self.is_spent())
            .finish()
    }
}

/// A reply that has not arrived yet.
///
/// Resolves when the correlated reply arrives from the request's destination.
/// Resolves to [`ReplyError::Canceled`] if the listener is removed first
/// (see `Router::forget`). There is no built-in timeout.
#[must_use = "a pending reply does nothing unless awaited"]
pub struct PendingReply<D> {
    correlation_id: CorrelationId,
    receiver: oneshot::Receiver<Reply<D>>,
}

impl<D> PendingReply<D> {
    /// The correlation id of the request.
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }
}

impl<D> Future for PendingReply<D> {
    type Output = Result<Reply<D>, ReplyError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.receiver
            .poll_unpin(cx)
            .map(|result| result.map_err(|_| ReplyError::Canceled))
    }
}

impl<D> fmt::Debug for PendingReply<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingReply")
            .field("correlation_id", &self.correlation_id)
            .finish()
    }
}

/// Builds a callback that resolves the returned [`PendingReply`].
pub(crate) fn pending<D: Send + 'static>() -> (ReplyCallback<D>, oneshot::Receiver<Reply<D>>) {
    let (sender, receiver) = oneshot::channel();
    let callback: ReplyCallback<D> = Box::new(move |reply| {
        // The receiver may be gone; the reply is then simply discarded.
        let _ = sender.send(reply);
    });
    (callback, receiver)
}

impl<D> PendingReply<D> {
    pub(crate) fn new(correlation_id: CorrelationId, receiver: oneshot::Receiver<Reply<D>>) -> Self {
        Self {
            correlation_id,
            receiver,
        }
    }
}
