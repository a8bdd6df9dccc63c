// libs/signaling-cell/src/services/mod.rs
pub mod connections;
pub mod dispatcher;
pub mod rooms;

pub use connections::ConnectionRegistry;
pub use dispatcher::{OutboundSink, PeerContext, SignalingRelay};
pub use rooms::{Departure, RoomRegistry};
