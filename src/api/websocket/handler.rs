//! WebSocket connection handler

use std::sync::Arc;

use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use tracing::warn;

use super::liveness::LivenessProber;
use super::state::AppState;
use crate::api::rest::ApiError;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    if !state.hub.has_capacity() {
        let limit = state.hub.config().max_connections;
        warn!(limit, "rejecting websocket upgrade, hub is full");
        let error = ApiError::unavailable(format!("Connection limit of {} reached", limit));
        return (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Register the connection and run its liveness loop until it terminates
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sink, stream) = socket.split();

    // A full hub drops the sink here, which closes the socket
    let handle = match state.hub.register(sink) {
        Ok(handle) => handle,
        Err(e) => {
            warn!(error = %e, "rejecting websocket connection");
            return;
        }
    };

    LivenessProber::new(Arc::clone(&state.hub), handle)
        .run(stream)
        .await;
}
