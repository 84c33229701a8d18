#![allow(dead_code)]

use courier::{
    Envelope, Router, RouterConfig,
    serde_json::Value,
    testing::{FakeTransport, Peer, Posted, RecordingHook},
};
use std::sync::Arc;

// ============================================================================
// Contexts
// ============================================================================

pub const SHOP_ORIGIN: &str = "https://shop.example.com";
pub const FRAME_ORIGIN: &str = "https://pay.example.com";
pub const EVIL_ORIGIN: &str = "https://evil.example.org";

pub const TOP: Peer = Peer("top");
pub const FRAME: Peer = Peer("frame");
pub const STRANGER: Peer = Peer("stranger");

// ============================================================================
// Fixtures
// ============================================================================

pub struct Fixture {
    pub transport: FakeTransport,
    pub router: Arc<Router<FakeTransport>>,
    pub traffic: RecordingHook,
}

/// A router with debug logging on and a recording hook attached.
pub fn fixture() -> Fixture {
    let transport = FakeTransport::new();
    let traffic = RecordingHook::new();
    let router = Router::new(
        transport.clone(),
        RouterConfig::new().debug_logging(true).hook(traffic.clone()),
    );
    Fixture {
        transport,
        router,
        traffic,
    }
}

/// A fixture whose default destination is the embedded frame.
pub fn fixture_talking_to_frame() -> Fixture {
    let fixture = fixture();
    fixture.router.set_destination(FRAME, FRAME_ORIGIN);
    fixture
}

/// An inbound request envelope with a fixed correlation id.
pub fn request(correlation_id: &str, subject: &str, content: Value, reply: bool) -> Envelope {
    let mut envelope = Envelope::new(subject, content, reply);
    envelope.correlation_id = correlation_id.into();
    envelope
}

/// Posts recorded by the transport, asserting there is exactly one.
pub fn single_post(transport: &FakeTransport) -> Posted {
    let mut posted = transport.take_posted();
    assert_eq!(posted.len(), 1, "expected exactly one post, got {posted:?}");
    posted.remove(0)
}
