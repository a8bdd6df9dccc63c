// libs/signaling-cell/src/models.rs
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Reserved prefix for per-user notification rooms. Rooms named
/// `user_<identity>` address a single user for out-of-band notifications
/// and are never tracked as call rooms.
pub const USER_ROOM_PREFIX: &str = "user_";

// ==============================================================================
// IDENTIFIERS
// ==============================================================================

/// Opaque identifier for one live transport connection (one browser tab's
/// socket). Minted by the WebSocket handler at upgrade time; the relay only
/// stores and compares it, never the connection itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable identity of an authenticated participant, independent of how many
/// times they connect. Sourced from the JWT `sub` claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Externally supplied name of a call session. A room has no persisted
/// lifecycle of its own: it exists only while the registry holds members
/// for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved notification room addressing a single user.
    pub fn notification_for(user: &UserId) -> Self {
        Self(format!("{}{}", USER_ROOM_PREFIX, user))
    }

    /// Notification rooms are joined at the transport level but excluded
    /// from call tracking entirely.
    pub fn is_notification(&self) -> bool {
        self.0.starts_with(USER_ROOM_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ==============================================================================
// SIGNALING EVENTS
// ==============================================================================

/// Inbound signaling events, one variant per wire event. Session
/// descriptions and ICE candidates are opaque payloads: the relay routes
/// them, it never inspects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Join {
        room: RoomId,
    },
    InitiateCall {
        target_user_id: UserId,
        room_id: RoomId,
    },
    Offer {
        room: RoomId,
        offer: Value,
    },
    Answer {
        room: RoomId,
        answer: Value,
    },
    IceCandidate {
        room: RoomId,
        candidate: Value,
    },
    EndCall {
        room: RoomId,
    },
}

/// Outbound signaling events, addressed to individual connections by the
/// dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent to the first joiner when the second party arrives.
    Ready {
        message: String,
    },
    /// Direct notification that someone is calling.
    IncomingCall {
        room_id: RoomId,
        caller: String,
    },
    /// The initiate-call target is not currently reachable.
    CallFailed {
        message: String,
    },
    Offer {
        offer: Value,
    },
    Answer {
        answer: Value,
    },
    IceCandidate {
        candidate: Value,
    },
    CallEnded {
        room: RoomId,
    },
    /// A room peer's connection went away.
    PeerLeft {
        connection_id: ConnectionId,
    },
}
