//! Outbound sends and one-shot reply correlation.

use courier::{
    CorrelationId, Delivery, Disposition, Envelope, InboundEvent, Outgoing, Reply, SendError,
    serde_json::{Value, json},
    testing::{Peer, Probe},
};
use std::collections::HashSet;

mod common;
use common::{
    FRAME, FRAME_ORIGIN, SHOP_ORIGIN, STRANGER, TOP, fixture, fixture_talking_to_frame, request,
    single_post,
};

fn reply_event(to: &CorrelationId, content: Value, origin: &str, source: Peer) -> InboundEvent<Peer> {
    InboundEvent::from_envelope(&Envelope::reply_to(to, content), origin, source).unwrap()
}

#[test]
fn test_handler_result_is_sent_back_to_source() {
    let f = fixture();
    f.router
        .set_listener("add", |(a, b): (i64, i64), _| Ok(a + b));

    f.transport
        .deliver_envelope(&request("c1", "add", json!([40, 2]), true), SHOP_ORIGIN, TOP);

    let posted = single_post(&f.transport);
    assert_eq!(posted.destination, TOP);
    assert_eq!(posted.target_origin, SHOP_ORIGIN);
    assert_eq!(posted.envelope.subject, "c1");
    assert_eq!(posted.envelope.content, json!(42));
    assert!(!posted.envelope.reply);
    assert_ne!(posted.envelope.correlation_id.as_str(), "c1");
    assert_eq!(
        f.traffic.dispositions(),
        vec![Disposition::Accepted, Disposition::Delivered]
    );
}

#[test]
fn test_no_reply_unless_requested() {
    let f = fixture();
    f.router.set_listener("add", |(a, b): (i64, i64), _| Ok(a + b));

    f.transport
        .deliver_envelope(&request("c1", "add", json!([1, 2]), false), SHOP_ORIGIN, TOP);

    assert!(f.transport.posted().is_empty());
}

#[test]
fn test_send_uses_defaults_and_fresh_ids() {
    let f = fixture_talking_to_frame();
    let mut ids = HashSet::new();
    for n in 0..100 {
        let id = f.router.send("scrollRelay", &json!({ "scrollY": n })).unwrap();
        assert!(ids.insert(id));
    }

    let posted = f.transport.take_posted();
    assert_eq!(posted.len(), 100);
    assert!(posted.iter().all(|p| p.destination == FRAME
        && p.target_origin == FRAME_ORIGIN
        && !p.envelope.reply));
    let wire: HashSet<_> = posted.iter().map(|p| p.envelope.correlation_id.clone()).collect();
    assert_eq!(wire, ids);
}

#[test]
fn test_send_wire_shape() {
    let f = fixture_talking_to_frame();
    f.router
        .dispatch(Outgoing::new("startPayment", json!({ "amount": 12 })).on_reply(|_| {}))
        .unwrap();

    let posted = single_post(&f.transport);
    let wire = posted.envelope.to_value().unwrap();
    assert_eq!(wire["subject"], json!("startPayment"));
    assert_eq!(wire["content"], json!({ "amount": 12 }));
    assert_eq!(wire["reply"], json!(true));
    assert!(wire["correlationId"].is_string());
}

#[test]
fn test_reply_fires_once_and_unregisters() {
    let f = fixture_talking_to_frame();
    let replies = Probe::new();
    let probe = replies.clone();
    let id = f
        .router
        .send_with_reply("add", &[2, 3], move |reply: Reply<Peer>| probe.record(reply))
        .unwrap();
    assert_eq!(f.router.pending_replies(), 1);
    assert!(single_post(&f.transport).envelope.reply);

    let delivery = f.router.receive(reply_event(&id, json!(5), FRAME_ORIGIN, FRAME));
    assert!(matches!(delivery, Delivery::Handled { failed: false, replied: false }));
    assert_eq!(f.router.pending_replies(), 0);

    // A duplicate reply finds no listener.
    let delivery = f.router.receive(reply_event(&id, json!(6), FRAME_ORIGIN, FRAME));
    assert!(matches!(delivery, Delivery::NoHandler));

    let replies = replies.calls();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].content, json!(5));
    assert_eq!(replies[0].source, FRAME);
    assert_eq!(replies[0].origin, FRAME_ORIGIN);
}

#[test]
fn test_reply_from_other_source_is_ignored() {
    let f = fixture_talking_to_frame();
    let replies = Probe::new();
    let probe = replies.clone();
    let id = f
        .router
        .send_with_reply("add", &[2, 3], move |reply: Reply<Peer>| probe.record(reply.content))
        .unwrap();

    let delivery = f.router.receive(reply_event(&id, json!(666), FRAME_ORIGIN, STRANGER));
    assert!(matches!(delivery, Delivery::ForeignReply));
    assert_eq!(replies.count(), 0);
    assert_eq!(f.router.pending_replies(), 1);

    f.router.receive(reply_event(&id, json!(5), FRAME_ORIGIN, FRAME));
    assert_eq!(replies.calls(), vec![json!(5)]);
    assert_eq!(f.router.pending_replies(), 0);
}

#[test]
fn test_reply_origin_is_not_checked() {
    let f = fixture_talking_to_frame();
    let replies = Probe::new();
    let probe = replies.clone();
    let id = f
        .router
        .send_with_reply("init", &(), move |reply: Reply<Peer>| probe.record(reply.origin))
        .unwrap();

    f.router
        .receive(reply_event(&id, Value::Null, "https://moved.example.net", FRAME));
    assert_eq!(replies.calls(), vec!["https://moved.example.net".to_string()]);
}

#[test]
fn test_reply_triggers_only_its_own_listener() {
    let f = fixture_talking_to_frame();
    let callbacks: Vec<Probe<Value>> = (0..5).map(|_| Probe::new()).collect();
    let ids: Vec<CorrelationId> = callbacks
        .iter()
        .map(|callback| {
            let probe = callback.clone();
            f.router
                .send_with_reply("init", &(), move |reply: Reply<Peer>| probe.record(reply.content))
                .unwrap()
        })
        .collect();
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 5);
    assert_eq!(f.router.pending_replies(), 5);

    f.router.receive(reply_event(&ids[2], json!("third"), FRAME_ORIGIN, FRAME));

    let counts: Vec<usize> = callbacks.iter().map(Probe::count).collect();
    assert_eq!(counts, vec![0, 0, 1, 0, 0]);
    assert_eq!(callbacks[2].calls(), vec![json!("third")]);
    assert_eq!(f.router.pending_replies(), 4);
}

#[test]
fn test_unanswered_request_stays_pending_until_forgotten() {
    let f = fixture_talking_to_frame();
    let first = f.router.send_with_reply("init", &(), |_| {}).unwrap();
    let _second = f.router.send_with_reply("init", &(), |_| {}).unwrap();
    assert_eq!(f.router.pending_replies(), 2);

    assert!(f.router.forget(&first));
    assert_eq!(f.router.pending_replies(), 1);
    let delivery = f.router.receive(reply_event(&first, json!(1), FRAME_ORIGIN, FRAME));
    assert!(matches!(delivery, Delivery::NoHandler));
}

#[test]
fn test_undeliverable_send_registers_nothing() {
    let f = fixture();
    let result = f.router.send_with_reply("init", &(), |_| {});
    assert!(matches!(result, Err(SendError::NoDestination)));
    assert_eq!(f.router.pending_replies(), 0);
    assert!(f.transport.posted().is_empty());
}
