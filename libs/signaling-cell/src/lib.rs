// libs/signaling-cell/src/lib.rs
//! # Signaling Cell
//!
//! This cell provides the call signaling relay for patient-doctor video
//! consultations: a process-local rendezvous service that pairs exactly two
//! peers in a room and shuttles WebRTC negotiation messages (session
//! descriptions and ICE candidates) between their browsers. Media never
//! touches this service — once negotiation completes, audio and video flow
//! peer to peer.
//!
//! ## Architecture
//!
//! The signaling cell follows the established cell architecture pattern:
//!
//! ```text
//! +-----------------------------------------------------+
//! |                 Signaling Cell                      |
//! +-----------------------------------------------------+
//! |  handlers.rs    |  WebSocket + HTTP endpoints       |
//! |  router.rs      |  Route definitions                |
//! |  models.rs      |  Ids and wire events              |
//! |  state.rs       |  Shared relay handle              |
//! |  transport.rs   |  Per-connection delivery channels |
//! |  services/      |  Relay logic                      |
//! |    connections.rs| user identity -> connection      |
//! |    rooms.rs     |  room identity -> members         |
//! |    dispatcher.rs|  event routing state machine      |
//! +-----------------------------------------------------+
//! ```
//!
//! ## Protocol
//!
//! Inbound events over the WebSocket (JSON, `"type"`-tagged):
//! `join`, `initiate_call`, `offer`, `answer`, `ice_candidate`, `end_call`.
//!
//! Outbound events: `ready` (to the first joiner when the second party
//! arrives), `incoming_call`, `call_failed`, relayed `offer` / `answer` /
//! `ice_candidate`, `call_ended`, `peer_left`.
//!
//! Rooms are ephemeral: an entry exists from the first join until the
//! membership drains (disconnects) or the call is explicitly ended. Rooms
//! named `user_<identity>` are reserved notification channels and never
//! enter call tracking.
//!
//! ## Endpoints
//!
//! - `GET /signaling/ws?token=<jwt>` - WebSocket upgrade (token also
//!   accepted as a Bearer header for non-browser clients)
//! - `GET /signaling/health` - liveness and configuration probe
//! - `GET /signaling/presence/{user_id}` - is this user connected
//!
//! ## Scaling caveat
//!
//! State is process-local and unreplicated. Two peers must reach the same
//! relay instance to be paired; a restart drops every room and binding and
//! clients must rejoin.
//!
//! ## Usage Example
//!
//! ```rust
//! use signaling_cell::router::signaling_routes;
//! use shared_config::AppConfig;
//! use std::sync::Arc;
//!
//! let config = Arc::new(AppConfig::from_env());
//! let routes = signaling_routes(config);
//! ```

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;
pub mod transport;

// Re-export commonly used types
pub use models::{ClientEvent, ConnectionId, RoomId, ServerEvent, UserId, USER_ROOM_PREFIX};
pub use services::{OutboundSink, PeerContext, SignalingRelay};
pub use state::{CellState, SharedRelay};
pub use transport::ClientSinks;

pub use router::signaling_routes;
