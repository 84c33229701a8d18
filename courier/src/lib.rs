//! # courier - Cross-Context Message Router
//!
//! `courier` connects two isolated execution contexts (a hosting page and an
//! embedded frame, two workers, two processes) that can only exchange opaque,
//! asynchronously delivered messages. Either side registers handlers for
//! named operations, invokes the other side's handlers as remote calls,
//! receives correlated replies, and ignores messages from untrusted origins.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//! use courier::memory::MemoryHub;
//!
//! let hub = MemoryHub::new();
//! let frame = Router::new(hub.context("https://pay.example"), RouterConfig::new());
//! let shop = Router::new(hub.context("https://shop.example"), RouterConfig::new());
//!
//! frame.set_listener("add", |(a, b): (i64, i64), _event| Ok(a + b));
//!
//! shop.set_destination(frame.transport().id(), "https://pay.example");
//! shop.send_with_reply("add", &(2, 3), |reply| {
//!     assert_eq!(reply.decode::<i64>().unwrap(), 5);
//! })?;
//! hub.run_until_idle();
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use courier_core::{
    // Error types
    BoxError,
    // Wire
    CorrelationId,
    // Hook
    Direction,
    DispatchError,
    Disposition,
    // Handler
    DynHandler,
    Envelope,
    Exception,
    FnHandler,
    Handler,
    HandlerError,
    HandlerResult,
    Hook,
    // Transport
    Inbox,
    InboundEvent,
    ReplyError,
    SendError,
    // Subject
    Subject,
    Traffic,
    Transport,
    TransportError,
    // Validator
    AcceptAll,
    Validator,
};

// Routing
pub use courier_std::{
    registry::{HandlerRegistry, Route},
    reply::{PendingReply, Reply, ReplyListener},
    router::{Delivery, Outgoing, Router, RouterConfig, RouterOption},
};

pub use serde_json;

/// Standard hook implementations.
pub mod hooks {
    pub use courier_std::hooks::LoggingHook;
}

/// Stock validators.
pub mod validators {
    pub use courier_std::validators::{
        ExactOrigin, FrameAnchored, OriginPrefix, SameBaseDomain, SourceIs, TrustAnchor,
        base_domain,
    };
}

/// In-process transport.
pub mod memory {
    pub use courier_std::memory::{ANY_ORIGIN, ContextId, MemoryHub, MemoryPort};
}

/// Testing utilities.
pub mod testing {
    pub use courier_std::testing::{FakeTransport, Observed, Peer, Posted, Probe, RecordingHook};
}

/// Prelude module - common imports for Courier.
///
/// # Usage
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        HandlerError,
        HandlerResult,
        // Core traits
        Handler,
        InboundEvent,
        // Routing
        Reply,
        Router,
        RouterConfig,
        RouterOption,
        SendError,
        Subject,
        Transport,
        Validator,
    };
}

#[cfg(feature = "macros")]
pub use courier_macros::Subject;
