use assert_matches::assert_matches;
use serde_json::json;

use shared_utils::test_utils::TestUser;
use signaling_cell::models::{ClientEvent, ConnectionId, RoomId, ServerEvent, UserId};
use signaling_cell::services::{OutboundSink, PeerContext, SignalingRelay};

/// Test double for the transport: records every delivery in order.
#[derive(Default)]
struct RecordingSink {
    delivered: Vec<(ConnectionId, ServerEvent)>,
}

impl OutboundSink for RecordingSink {
    fn deliver(&mut self, target: ConnectionId, event: ServerEvent) {
        self.delivered.push((target, event));
    }
}

impl RecordingSink {
    fn events_for(&self, target: ConnectionId) -> Vec<&ServerEvent> {
        self.delivered
            .iter()
            .filter(|(to, _)| *to == target)
            .map(|(_, event)| event)
            .collect()
    }

    fn count_ready(&self) -> usize {
        self.delivered
            .iter()
            .filter(|(_, event)| matches!(event, ServerEvent::Ready { .. }))
            .count()
    }
}

fn doctor(email: &str) -> PeerContext {
    PeerContext::new(ConnectionId::new(), TestUser::doctor(email).to_user())
}

fn patient(email: &str) -> PeerContext {
    PeerContext::new(ConnectionId::new(), TestUser::patient(email).to_user())
}

fn join(relay: &mut SignalingRelay, ctx: &PeerContext, room: &str, sink: &mut RecordingSink) {
    relay.dispatch(
        ctx,
        ClientEvent::Join {
            room: RoomId::from(room),
        },
        sink,
    );
}

#[test]
fn two_party_ready_addresses_first_joiner() {
    let mut relay = SignalingRelay::new();
    let mut sink = RecordingSink::default();
    let a = doctor("a@example.com");
    let b = patient("b@example.com");
    let c = patient("c@example.com");

    join(&mut relay, &a, "consult-1", &mut sink);
    assert_eq!(sink.count_ready(), 0);

    join(&mut relay, &b, "consult-1", &mut sink);
    assert_eq!(sink.count_ready(), 1);
    assert_matches!(
        sink.events_for(a.connection_id).as_slice(),
        [ServerEvent::Ready { .. }]
    );
    assert!(sink.events_for(b.connection_id).is_empty());

    // A third join is carried but triggers nothing.
    join(&mut relay, &c, "consult-1", &mut sink);
    assert_eq!(sink.count_ready(), 1);
    assert_eq!(relay.room_members(&RoomId::from("consult-1")).len(), 3);
}

#[test]
fn rejoin_is_idempotent_and_does_not_retrigger_ready() {
    let mut relay = SignalingRelay::new();
    let mut sink = RecordingSink::default();
    let a = doctor("a@example.com");
    let b = patient("b@example.com");

    join(&mut relay, &a, "consult-1", &mut sink);
    join(&mut relay, &b, "consult-1", &mut sink);
    assert_eq!(sink.count_ready(), 1);

    join(&mut relay, &b, "consult-1", &mut sink);
    join(&mut relay, &a, "consult-1", &mut sink);

    assert_eq!(relay.room_members(&RoomId::from("consult-1")).len(), 2);
    assert_eq!(sink.count_ready(), 1);
}

#[test]
fn notification_rooms_are_never_call_tracked() {
    let mut relay = SignalingRelay::new();
    let mut sink = RecordingSink::default();
    let a = doctor("a@example.com");
    let b = patient("b@example.com");

    join(&mut relay, &a, "user_42", &mut sink);
    join(&mut relay, &b, "user_42", &mut sink);

    assert_eq!(relay.room_count(), 0);
    assert!(sink.delivered.is_empty());
}

#[test]
fn initiate_call_reaches_a_connected_target() {
    let mut relay = SignalingRelay::new();
    let mut sink = RecordingSink::default();
    let caller = doctor("doctor@example.com");
    let callee = patient("patient@example.com");

    relay.connect(&caller);
    relay.connect(&callee);

    relay.dispatch(
        &caller,
        ClientEvent::InitiateCall {
            target_user_id: callee.user_id(),
            room_id: RoomId::from("consult-1"),
        },
        &mut sink,
    );

    assert_eq!(
        sink.events_for(callee.connection_id),
        vec![&ServerEvent::IncomingCall {
            room_id: RoomId::from("consult-1"),
            caller: "doctor@example.com".to_string(),
        }]
    );
    assert!(sink.events_for(caller.connection_id).is_empty());
}

#[test]
fn initiate_call_to_unreachable_target_fails_back_to_caller() {
    let mut relay = SignalingRelay::new();
    let mut sink = RecordingSink::default();
    let caller = doctor("doctor@example.com");

    relay.connect(&caller);

    relay.dispatch(
        &caller,
        ClientEvent::InitiateCall {
            target_user_id: UserId::from("nobody"),
            room_id: RoomId::from("consult-1"),
        },
        &mut sink,
    );

    // Exactly one call_failed, to the initiator, and nothing to anyone else.
    assert_eq!(sink.delivered.len(), 1);
    assert_matches!(
        sink.events_for(caller.connection_id).as_slice(),
        [ServerEvent::CallFailed { .. }]
    );
}

#[test]
fn rebinding_makes_only_the_newest_connection_reachable() {
    let mut relay = SignalingRelay::new();
    let mut sink = RecordingSink::default();
    let caller = doctor("doctor@example.com");

    // The same user connects twice; the second connection wins.
    let user = TestUser::patient("patient@example.com");
    let stale = PeerContext::new(ConnectionId::new(), user.to_user());
    let fresh = PeerContext::new(ConnectionId::new(), user.to_user());
    relay.connect(&caller);
    relay.connect(&stale);
    relay.connect(&fresh);

    relay.dispatch(
        &caller,
        ClientEvent::InitiateCall {
            target_user_id: fresh.user_id(),
            room_id: RoomId::from("consult-1"),
        },
        &mut sink,
    );

    assert!(sink.events_for(stale.connection_id).is_empty());
    assert_eq!(sink.events_for(fresh.connection_id).len(), 1);
}

#[test]
fn broadcast_excludes_sender() {
    let mut relay = SignalingRelay::new();
    let mut sink = RecordingSink::default();
    let a = doctor("a@example.com");
    let b = patient("b@example.com");
    let c = patient("c@example.com");

    join(&mut relay, &a, "consult-1", &mut sink);
    join(&mut relay, &b, "consult-1", &mut sink);
    join(&mut relay, &c, "consult-1", &mut sink);
    sink.delivered.clear();

    let offer = json!({"type": "offer", "sdp": "v=0..."});
    relay.dispatch(
        &a,
        ClientEvent::Offer {
            room: RoomId::from("consult-1"),
            offer: offer.clone(),
        },
        &mut sink,
    );

    assert!(sink.events_for(a.connection_id).is_empty());
    for peer in [&b, &c] {
        assert_eq!(
            sink.events_for(peer.connection_id),
            vec![&ServerEvent::Offer {
                offer: offer.clone()
            }]
        );
    }
}

#[test]
fn answer_and_candidate_relay_to_the_other_party() {
    let mut relay = SignalingRelay::new();
    let mut sink = RecordingSink::default();
    let a = doctor("a@example.com");
    let b = patient("b@example.com");

    join(&mut relay, &a, "consult-1", &mut sink);
    join(&mut relay, &b, "consult-1", &mut sink);
    sink.delivered.clear();

    relay.dispatch(
        &b,
        ClientEvent::Answer {
            room: RoomId::from("consult-1"),
            answer: json!({"type": "answer", "sdp": "v=0..."}),
        },
        &mut sink,
    );
    relay.dispatch(
        &b,
        ClientEvent::IceCandidate {
            room: RoomId::from("consult-1"),
            candidate: json!({"candidate": "candidate:0 1 UDP ..."}),
        },
        &mut sink,
    );

    let to_a = sink.events_for(a.connection_id);
    assert!(matches!(to_a[0], ServerEvent::Answer { .. }));
    assert!(matches!(to_a[1], ServerEvent::IceCandidate { .. }));
    assert!(sink.events_for(b.connection_id).is_empty());
}

#[test]
fn relay_into_unknown_room_is_a_silent_noop() {
    let mut relay = SignalingRelay::new();
    let mut sink = RecordingSink::default();
    let a = doctor("a@example.com");

    relay.dispatch(
        &a,
        ClientEvent::Offer {
            room: RoomId::from("ghost"),
            offer: json!({}),
        },
        &mut sink,
    );
    relay.dispatch(
        &a,
        ClientEvent::EndCall {
            room: RoomId::from("ghost"),
        },
        &mut sink,
    );

    assert!(sink.delivered.is_empty());
}

#[test]
fn end_call_notifies_everyone_and_clears_the_room() {
    let mut relay = SignalingRelay::new();
    let mut sink = RecordingSink::default();
    let a = doctor("a@example.com");
    let b = patient("b@example.com");

    join(&mut relay, &a, "consult-1", &mut sink);
    join(&mut relay, &b, "consult-1", &mut sink);
    sink.delivered.clear();

    relay.dispatch(
        &a,
        ClientEvent::EndCall {
            room: RoomId::from("consult-1"),
        },
        &mut sink,
    );

    // Both parties hear call_ended, the sender included.
    for peer in [&a, &b] {
        assert_eq!(
            sink.events_for(peer.connection_id),
            vec![&ServerEvent::CallEnded {
                room: RoomId::from("consult-1"),
            }]
        );
    }
    assert!(relay.room_members(&RoomId::from("consult-1")).is_empty());
    assert_eq!(relay.room_count(), 0);
}

#[test]
fn disconnect_cleans_rooms_and_notifies_remaining_peers() {
    let mut relay = SignalingRelay::new();
    let mut sink = RecordingSink::default();
    let x = doctor("x@example.com");
    let y = patient("y@example.com");

    relay.connect(&x);
    relay.connect(&y);
    join(&mut relay, &x, "solo", &mut sink);
    join(&mut relay, &x, "pair", &mut sink);
    join(&mut relay, &y, "pair", &mut sink);
    sink.delivered.clear();

    relay.disconnect(x.connection_id, &mut sink);

    // The solo room drained away; the pair room survives with Y, who heard
    // exactly one departure notice.
    assert_eq!(relay.room_count(), 1);
    assert_eq!(relay.room_members(&RoomId::from("pair")), vec![y.connection_id]);
    assert_eq!(
        sink.events_for(y.connection_id),
        vec![&ServerEvent::PeerLeft {
            connection_id: x.connection_id,
        }]
    );
    assert_eq!(sink.delivered.len(), 1);

    // And the identity binding is gone.
    assert!(!relay.is_online(&x.user_id()));
    assert!(relay.is_online(&y.user_id()));
}

#[test]
fn restart_equivalent_state_is_empty() {
    let relay = SignalingRelay::new();
    assert_eq!(relay.connection_count(), 0);
    assert_eq!(relay.room_count(), 0);
}
