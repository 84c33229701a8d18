//! Error types for Courier.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`HandlerError`] - Failures raised by a handler; travel back as an [`Exception`]
//! - [`DispatchError`] - Inbound events the router could not process at all
//! - [`SendError`] - Outbound envelopes that were not posted
//! - [`TransportError`] - Failures reported by a [`Transport`]
//! - [`ReplyError`] - Failures observed by the side awaiting a reply
//!
//! None of these ever escape the router's receive path; they surface as values.
//!
//! [`Exception`]: crate::Exception
//! [`Transport`]: crate::Transport

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The result type returned by handlers.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Errors raised while running a handler.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The handler reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The envelope content did not match the handler's input type.
    #[error("invalid content: {0}")]
    InvalidContent(#[source] serde_json::Error),

    /// The handler output could not be encoded.
    #[error("invalid output: {0}")]
    InvalidOutput(#[source] serde_json::Error),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// A custom handler error.
    #[error(transparent)]
    Custom(BoxError),
}

impl HandlerError {
    /// Creates a [`HandlerError::Failed`] from any displayable message.
    pub fn msg(message: impl std::fmt::Display) -> Self {
        HandlerError::Failed(message.to_string())
    }
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        HandlerError::Custom(err)
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        HandlerError::Failed(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        HandlerError::Failed(message.to_owned())
    }
}

/// Errors that abort the processing of a single inbound event.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The delivered data was not an envelope.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Something panicked outside of handler execution.
    #[error("dispatch panicked: {0}")]
    Panicked(String),
}

/// Errors that prevent an envelope from being posted.
#[derive(Error, Debug)]
pub enum SendError {
    /// No destination was given and none is configured, or the destination
    /// cannot receive envelopes.
    #[error("no destination capable of receiving envelopes")]
    NoDestination,

    /// No destination origin was given and none is configured.
    #[error("no destination origin")]
    NoDestinationOrigin,

    /// The content could not be encoded.
    #[error("failed to encode content: {0}")]
    Encode(#[source] serde_json::Error),

    /// The transport refused the envelope.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors reported by a transport implementation.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The destination is gone.
    #[error("destination closed: {0}")]
    Closed(String),

    /// The envelope could not be encoded for the wire.
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),

    /// A custom transport error.
    #[error(transparent)]
    Custom(BoxError),
}

impl From<BoxError> for TransportError {
    fn from(err: BoxError) -> Self {
        TransportError::Custom(err)
    }
}

/// Errors observed when consuming a reply.
#[derive(Error, Debug)]
pub enum ReplyError {
    /// The remote handler failed; carries its exception message.
    #[error("remote exception: {0}")]
    Exception(String),

    /// The reply content did not match the expected type.
    #[error("failed to decode reply: {0}")]
    Decode(#[source] serde_json::Error),

    /// The reply listener was removed before a reply arrived.
    #[error("reply listener was removed")]
    Canceled,
}
