// libs/signaling-cell/src/services/dispatcher.rs
use tracing::{debug, info};

use shared_models::auth::User;

use crate::models::{ClientEvent, ConnectionId, RoomId, ServerEvent, UserId};
use crate::services::connections::ConnectionRegistry;
use crate::services::rooms::RoomRegistry;

/// Payload text of the `ready` event, kept client-compatible.
const READY_MESSAGE: &str = "Second user joined, start call";

/// Delivery seam between the dispatcher and the transport. The production
/// implementation pushes into per-connection channels; tests record.
///
/// Delivery must not suspend or fail: an event addressed to a connection
/// that has silently vanished is dropped, not retried.
pub trait OutboundSink {
    fn deliver(&mut self, target: ConnectionId, event: ServerEvent);
}

/// Everything the dispatcher knows about the connection an event came from.
/// Identity is resolved by the transport before any event gets here.
#[derive(Debug, Clone)]
pub struct PeerContext {
    pub connection_id: ConnectionId,
    pub user: User,
}

impl PeerContext {
    pub fn new(connection_id: ConnectionId, user: User) -> Self {
        Self {
            connection_id,
            user,
        }
    }

    pub fn user_id(&self) -> UserId {
        UserId::from(self.user.id.as_str())
    }
}

/// The signaling relay: owns the two registries and routes the six inbound
/// event kinds between connections.
///
/// Per room the state machine is observed through membership size alone:
/// empty → waiting (first join) → ready (second join, `ready` emitted to
/// the first joiner) → empty again via `end_call` or disconnect drain.
/// Joins past two are carried but trigger no further transition.
///
/// The relay is not a global: construct as many independent instances as
/// needed and share one behind a mutex (both registries under a single
/// lock, so the join→ready check-then-act is atomic).
#[derive(Debug, Default)]
pub struct SignalingRelay {
    connections: ConnectionRegistry,
    rooms: RoomRegistry,
}

impl SignalingRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly connected peer: binds its user identity to the
    /// new connection handle, overwriting any previous binding.
    pub fn connect(&mut self, ctx: &PeerContext) {
        info!(
            "User {} mapped to connection {}",
            ctx.user.id, ctx.connection_id
        );
        self.connections.bind(ctx.user_id(), ctx.connection_id);
    }

    /// Transport-level disconnect: unbind the handle, then drain it out of
    /// every room, notifying the remaining peers room by room.
    pub fn disconnect(&mut self, connection_id: ConnectionId, sink: &mut dyn OutboundSink) {
        info!("Connection {} disconnected", connection_id);
        self.connections.unbind(connection_id);

        for departure in self.rooms.leave_all(connection_id) {
            debug!(
                "Connection {} left room {} ({} remaining)",
                connection_id,
                departure.room,
                departure.remaining.len()
            );
            for peer in departure.remaining {
                sink.deliver(peer, ServerEvent::PeerLeft { connection_id });
            }
        }
    }

    /// Routes one inbound event. Registry operations are total and nothing
    /// here fails: the only user-visible failure is `call_failed`.
    pub fn dispatch(&mut self, ctx: &PeerContext, event: ClientEvent, sink: &mut dyn OutboundSink) {
        match event {
            ClientEvent::Join { room } => self.handle_join(ctx, room, sink),
            ClientEvent::InitiateCall {
                target_user_id,
                room_id,
            } => self.handle_initiate_call(ctx, target_user_id, room_id, sink),
            ClientEvent::Offer { room, offer } => {
                self.relay_to_peers(ctx.connection_id, &room, ServerEvent::Offer { offer }, sink)
            }
            ClientEvent::Answer { room, answer } => {
                self.relay_to_peers(ctx.connection_id, &room, ServerEvent::Answer { answer }, sink)
            }
            ClientEvent::IceCandidate { room, candidate } => self.relay_to_peers(
                ctx.connection_id,
                &room,
                ServerEvent::IceCandidate { candidate },
                sink,
            ),
            ClientEvent::EndCall { room } => self.handle_end_call(ctx, room, sink),
        }
    }

    fn handle_join(&mut self, ctx: &PeerContext, room: RoomId, sink: &mut dyn OutboundSink) {
        // Notification rooms address a single user out-of-band; they never
        // enter call tracking.
        if room.is_notification() {
            debug!(
                "Connection {} joined notification room {}",
                ctx.connection_id, room
            );
            return;
        }

        let already_member = self.rooms.members(&room).contains(&ctx.connection_id);
        let size = self.rooms.join(room.clone(), ctx.connection_id);
        info!("Room {} now has {} member(s)", room, size);

        // A rejoin never re-triggers ready, and a third join never fires a
        // second one. The first joiner is the caller.
        if !already_member && size == 2 {
            let caller = self.rooms.members(&room)[0];
            debug!("Signaling ready to caller {}", caller);
            sink.deliver(
                caller,
                ServerEvent::Ready {
                    message: READY_MESSAGE.to_string(),
                },
            );
        }
    }

    fn handle_initiate_call(
        &mut self,
        ctx: &PeerContext,
        target: UserId,
        room_id: RoomId,
        sink: &mut dyn OutboundSink,
    ) {
        match self.connections.lookup(&target) {
            Some(target_conn) => {
                info!(
                    "User {} calling {} in room {}",
                    ctx.user.id, target, room_id
                );
                sink.deliver(
                    target_conn,
                    ServerEvent::IncomingCall {
                        room_id,
                        caller: ctx.user.display_name().to_string(),
                    },
                );
            }
            None => {
                info!("Call target {} is not connected", target);
                sink.deliver(
                    ctx.connection_id,
                    ServerEvent::CallFailed {
                        message: format!("User {} is not currently online", target),
                    },
                );
            }
        }
    }

    /// Broadcast to every room member except the sender. Unknown rooms have
    /// no members, so stale references fall through silently.
    fn relay_to_peers(
        &self,
        from: ConnectionId,
        room: &RoomId,
        event: ServerEvent,
        sink: &mut dyn OutboundSink,
    ) {
        debug!("Relaying {} in room {}", event_kind(&event), room);
        for member in self.rooms.members(room) {
            if *member != from {
                sink.deliver(*member, event.clone());
            }
        }
    }

    /// Explicit teardown: `call_ended` goes to every member, the sender
    /// included, then the room entry is dropped. A stale room is a no-op.
    fn handle_end_call(&mut self, ctx: &PeerContext, room: RoomId, sink: &mut dyn OutboundSink) {
        let members = self.rooms.members(&room).to_vec();
        if members.is_empty() {
            debug!("end_call for unknown room {}", room);
            return;
        }

        info!("User {} ended the call in room {}", ctx.user.id, room);
        for member in members {
            sink.deliver(member, ServerEvent::CallEnded { room: room.clone() });
        }
        self.rooms.clear(&room);
    }

    /// Whether `user` currently has a live connection.
    pub fn is_online(&self, user: &UserId) -> bool {
        self.connections.lookup(user).is_some()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Membership snapshot, exposed for tests and the health surface.
    pub fn room_members(&self, room: &RoomId) -> Vec<ConnectionId> {
        self.rooms.members(room).to_vec()
    }
}

fn event_kind(event: &ServerEvent) -> &'static str {
    match event {
        ServerEvent::Ready { .. } => "ready",
        ServerEvent::IncomingCall { .. } => "incoming_call",
        ServerEvent::CallFailed { .. } => "call_failed",
        ServerEvent::Offer { .. } => "offer",
        ServerEvent::Answer { .. } => "answer",
        ServerEvent::IceCandidate { .. } => "ice_candidate",
        ServerEvent::CallEnded { .. } => "call_ended",
        ServerEvent::PeerLeft { .. } => "peer_left",
    }
}
