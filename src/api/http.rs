//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use super::rest::{connections, polls};
use super::websocket::{handler::ws_handler, state::AppState};

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - allow all origins, browsers connect from the UI dev server
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(ws_handler))
        // Status
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/connections", get(connections::get_connections))
        .route("/stats", get(connections::get_stats))
        // Poll API
        .route("/polls", get(polls::list_polls).post(polls::create_poll))
        .route("/polls/", get(polls::list_polls).post(polls::create_poll))
        .route("/polls/vote", post(polls::vote))
        .route("/polls/like", post(polls::like_poll))
        .route("/polls/comment", post(polls::add_comment))
        .route("/polls/comment/like", post(polls::like_comment))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({"message": "QuickPoll API is running", "status": "ok"}))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
