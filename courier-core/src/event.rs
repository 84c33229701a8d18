//! Inbound events as delivered by a transport.

use crate::envelope::Envelope;
use serde_json::Value;

/// An envelope plus the transport metadata describing its sender.
///
/// `data` is kept raw: decoding it into an [`Envelope`] is part of dispatch,
/// so a malformed payload is a dispatch failure rather than a transport one.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent<D> {
    /// The delivered payload, expected to be an envelope.
    pub data: Value,
    /// The security origin of the sending context.
    pub origin: String,
    /// Handle to the sending context; also the destination of any reply.
    pub source: D,
}

impl<D> InboundEvent<D> {
    /// Creates an event from raw delivered data.
    pub fn new(data: Value, origin: impl Into<String>, source: D) -> Self {
        Self {
            data,
            origin: origin.into(),
            source,
        }
    }

    /// Creates an event carrying an already-built envelope.
    pub fn from_envelope(
        envelope: &Envelope,
        origin: impl Into<String>,
        source: D,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(envelope.to_value()?, origin, source))
    }

    /// Decodes the envelope carried by this event.
    pub fn envelope(&self) -> Result<Envelope, serde_json::Error> {
        Envelope::from_value(&self.data)
    }
}
