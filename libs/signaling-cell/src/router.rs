// libs/signaling-cell/src/router.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;
use crate::state::CellState;

/// Creates the signaling routes with a fresh relay instance.
pub fn signaling_routes(config: Arc<AppConfig>) -> Router {
    signaling_routes_with_state(CellState::new(config))
}

/// Same, against caller-supplied state. Tests use this to reach into the
/// relay behind the router.
pub fn signaling_routes_with_state(state: CellState) -> Router {
    // The WebSocket endpoint authenticates in-handler (query param or
    // Bearer header), so it sits with the public routes.
    let public_routes = Router::new()
        .route("/health", get(signaling_health))
        .route("/ws", get(signaling_ws));

    let protected_routes = Router::new()
        .route("/presence/{user_id}", get(user_presence))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
