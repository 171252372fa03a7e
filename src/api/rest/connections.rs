//! Operator endpoints backed by the connection hub

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::websocket::state::AppState;

/// Response for GET /connections
#[derive(Debug, Serialize)]
pub struct ConnectionCount {
    pub active_connections: usize,
}

/// Response for GET /stats
#[derive(Debug, Serialize)]
pub struct ServerStats {
    pub total_polls: usize,
    pub total_votes: i64,
    pub total_comments: usize,
    pub active_connections: usize,
}

/// GET /connections - Sweep dead connections, then report the live count
pub async fn get_connections(State(state): State<Arc<AppState>>) -> Json<ConnectionCount> {
    state.hub.cleanup_dead_connections();
    Json(ConnectionCount {
        active_connections: state.hub.size(),
    })
}

/// GET /stats - Store totals and live connection count
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ServerStats> {
    let store = state.polls.stats();
    Json(ServerStats {
        total_polls: store.total_polls,
        total_votes: store.total_votes,
        total_comments: store.total_comments,
        active_connections: state.hub.size(),
    })
}
