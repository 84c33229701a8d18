//! Validators decide whether an inbound event is trusted enough to dispatch.
//!
//! A subject-level validator fully overrides the router default for that
//! subject. A validator must answer `false` when it cannot establish trust;
//! it never errors.

use crate::event::InboundEvent;

/// A trust predicate over inbound events.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Validator` for events from `{D}`",
    label = "missing `Validator` implementation",
    note = "Closures of type `Fn(&InboundEvent<{D}>) -> bool` are validators."
)]
pub trait Validator<D>: Send + Sync + 'static {
    /// Returns `true` if the event may be dispatched.
    fn validate(&self, event: &InboundEvent<D>) -> bool;
}

impl<D, F> Validator<D> for F
where
    F: Fn(&InboundEvent<D>) -> bool + Send + Sync + 'static,
{
    fn validate(&self, event: &InboundEvent<D>) -> bool {
        (self)(event)
    }
}

/// Accepts every event.
///
/// The router already accepts when no validator resolves; install this on a
/// subject to open it up under a restrictive router default.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<D> Validator<D> for AcceptAll {
    fn validate(&self, _event: &InboundEvent<D>) -> bool {
        true
    }
}
