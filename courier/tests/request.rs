//! Future-based requests.

use courier::{
    Envelope, ReplyError,
    serde_json::json,
};

mod common;
use common::{FRAME, FRAME_ORIGIN, STRANGER, fixture_talking_to_frame, single_post};

#[tokio::test]
async fn test_request_resolves_with_reply() {
    let f = fixture_talking_to_frame();
    let pending = f.router.request("add", &[20, 22]).unwrap();
    let id = pending.correlation_id().clone();
    assert_eq!(single_post(&f.transport).envelope.correlation_id, id);

    f.transport
        .deliver_envelope(&Envelope::reply_to(&id, json!(42)), FRAME_ORIGIN, FRAME);

    let reply = pending.await.unwrap();
    assert_eq!(reply.decode::<i64>().unwrap(), 42);
    assert_eq!(reply.source, FRAME);
}

#[tokio::test]
async fn test_request_surfaces_remote_exception() {
    let f = fixture_talking_to_frame();
    let pending = f.router.request("startPayment", &json!({ "amount": 12 })).unwrap();
    let id = pending.correlation_id().clone();

    f.transport.deliver_envelope(
        &Envelope::reply_to(&id, json!({ "exception": "card declined" })),
        FRAME_ORIGIN,
        FRAME,
    );

    let reply = pending.await.unwrap();
    assert!(reply.exception().is_some());
    assert!(matches!(
        reply.decode::<courier::serde_json::Value>(),
        Err(ReplyError::Exception(message)) if message == "card declined"
    ));
}

#[tokio::test]
async fn test_forgotten_request_is_canceled() {
    let f = fixture_talking_to_frame();
    let pending = f.router.request("init", &()).unwrap();

    // A reply from the wrong context does not resolve it.
    f.transport.deliver_envelope(
        &Envelope::reply_to(pending.correlation_id(), json!(1)),
        FRAME_ORIGIN,
        STRANGER,
    );
    assert!(f.router.forget(pending.correlation_id()));

    assert!(matches!(pending.await, Err(ReplyError::Canceled)));
}

#[tokio::test]
async fn test_request_without_destination_fails_fast() {
    let f = common::fixture();
    assert!(f.router.request("init", &()).is_err());
    assert_eq!(f.router.pending_replies(), 0);
}
