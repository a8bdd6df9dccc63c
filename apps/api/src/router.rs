use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;
use signaling_cell::router::signaling_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "CareLink signaling API is running!" }))
        .nest("/signaling", signaling_routes(state))
}
