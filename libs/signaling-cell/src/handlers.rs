// libs/signaling-cell/src/handlers.rs
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Extension, Path, Query, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::Response,
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{info, warn};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::bearer_token;
use shared_utils::jwt::validate_token;

use crate::models::{ClientEvent, ConnectionId, UserId};
use crate::services::PeerContext;
use crate::state::CellState;

// ==============================================================================
// WEBSOCKET ENDPOINT
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    pub token: Option<String>,
}

/// WebSocket entry point for the signaling relay.
///
/// Browsers cannot set an `Authorization` header on upgrade requests, so
/// the token is accepted from the `token` query parameter as well. An
/// invalid or missing token rejects with 401 before any socket exists.
pub async fn signaling_ws(
    State(state): State<CellState>,
    Query(query): Query<WsAuthQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let token = query
        .token
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| AppError::Auth("Missing signaling token".to_string()))?;

    let user = validate_token(&token, &state.config.jwt_secret).map_err(AppError::Auth)?;

    Ok(ws.on_upgrade(move |socket| client_session(socket, state, user)))
}

/// One task per connection: mint the handle, bind the identity, then pump
/// frames until the socket closes. The relay lock is only ever taken for
/// plain map work and non-blocking channel sends.
async fn client_session(socket: WebSocket, state: CellState, user: User) {
    let connection_id = ConnectionId::new();
    let ctx = PeerContext::new(connection_id, user);
    info!("Client connected: {} (user {})", connection_id, ctx.user.id);

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    state.sinks.register(connection_id, outbound_tx);
    state.relay.lock().unwrap().connect(&ctx);

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Writer task: drain the connection's channel into the socket.
    let writer = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = ws_receiver.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    let mut sinks = state.sinks.clone();
                    state.relay.lock().unwrap().dispatch(&ctx, event, &mut sinks);
                }
                Err(err) => {
                    warn!(
                        "Connection {} sent an unrecognized frame: {}",
                        connection_id, err
                    );
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    writer.abort();
    state.sinks.unregister(connection_id);
    let mut sinks = state.sinks.clone();
    state.relay.lock().unwrap().disconnect(connection_id, &mut sinks);
    info!("Client session closed: {}", connection_id);
}

// ==============================================================================
// HTTP ENDPOINTS
// ==============================================================================

/// Liveness plus configuration probe, with current registry sizes.
pub async fn signaling_health(State(state): State<CellState>) -> Json<Value> {
    let (connections, rooms) = {
        let relay = state.relay.lock().unwrap();
        (relay.connection_count(), relay.room_count())
    };

    Json(json!({
        "status": "healthy",
        "service": "signaling-cell",
        "auth_configured": state.config.is_configured(),
        "connections": connections,
        "rooms": rooms,
    }))
}

/// Whether a user currently has a live signaling connection. This is the
/// queryable form of the "is the patient online" check callers do before
/// ringing someone.
pub async fn user_presence(
    State(state): State<CellState>,
    Path(user_id): Path<String>,
    Extension(_user): Extension<User>,
) -> Json<Value> {
    let online = state
        .relay
        .lock()
        .unwrap()
        .is_online(&UserId::from(user_id.as_str()));

    Json(json!({
        "user_id": user_id,
        "online": online,
    }))
}
