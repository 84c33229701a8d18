//! # courier-core
//!
//! Core types and traits for the Courier cross-context message router.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! transport implementations and applications that only need to describe
//! handlers, validators and subjects without pulling in `courier-std`.
//!
//! # Building Blocks
//!
//! ## Wire ([`Envelope`], [`CorrelationId`], [`Exception`])
//!
//! The structured message unit exchanged between contexts. Field names are the
//! contract; the content is schema-flexible JSON.
//!
//! ## Port ([`Transport`], [`InboundEvent`])
//!
//! The channel supplied by the hosting environment, injected into the router.
//! It delivers [`InboundEvent`]s and posts envelopes to an opaque destination
//! filtered by origin.
//!
//! ## Endpoints ([`Handler`], [`Validator`])
//!
//! - **Handler**: the typed body of a named operation, returning an explicit
//!   [`HandlerResult`]
//! - **Validator**: a trust predicate evaluated before any handler runs
//!
//! ## Naming ([`Subject`])
//!
//! Closed enumerations of the subjects an application owns.
//!
//! ## Observation ([`Hook`])
//!
//! Traffic observers notified when debug logging is enabled.
//!
//! # Error Types
//!
//! - [`HandlerError`] - Handler failures, sent back as [`Exception`]s
//! - [`DispatchError`] - Inbound events that could not be processed
//! - [`SendError`] - Envelopes that were not posted

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod envelope;
mod error;
mod event;
mod handler;
mod hook;
mod subject;
mod transport;
mod validator;

// Re-exports
pub use envelope::{CorrelationId, Envelope, Exception};
pub use error::{
    BoxError, DispatchError, HandlerError, HandlerResult, ReplyError, SendError, TransportError,
};
pub use event::InboundEvent;
pub use handler::{DynHandler, FnHandler, Handler};
pub use hook::{Direction, Disposition, Hook, Traffic};
pub use subject::Subject;
pub use transport::{Inbox, Transport};
pub use validator::{AcceptAll, Validator};
