//! QuickPoll realtime server
//!
//! A poll service whose clients observe every vote, like and comment in
//! near real time over WebSocket, without polling.
//!
//! # Features
//!
//! - **Connection hub**: tracks live WebSocket connections and fans each
//!   committed change out to all of them
//! - **Failure isolation**: a failed or slow send retires only that
//!   connection; every send is bounded by a timeout
//! - **Liveness probing**: idle connections get a keepalive `ping`, and
//!   peers that stop answering are reaped
//! - **Best-effort delivery**: no persistence, no replay for clients that
//!   were offline
//!
//! # Modules
//!
//! - `api`: Axum router, REST endpoints and the WebSocket realtime core
//! - `poll_store`: In-memory poll data behind the REST API
//! - `types`: Poll and comment data structures
//! - `config`: Environment-driven server configuration
//! - `error`: Error types
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use quickpoll_hub::{create_router, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::from_env().unwrap();
//!     let state = Arc::new(AppState::new(config.hub.clone()));
//!     let listener = tokio::net::TcpListener::bind(config.bind_addr).await.unwrap();
//!     axum::serve(listener, create_router(state)).await.unwrap();
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod poll_store;
pub mod types;

// Re-export commonly used items at crate root
pub use api::http::create_router;
pub use api::websocket::{
    AppState, BroadcastReport, ConnectionHandle, ConnectionHub, ConnectionState, LivenessProber,
    PollEvent,
};
pub use config::{HubConfig, ServerConfig};
pub use poll_store::PollStore;
pub use types::{Comment, Poll, ServerResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
