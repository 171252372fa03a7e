//! WebSocket module for real-time poll updates
//!
//! Provides the WebSocket endpoint at `/ws`. Every committed mutation is
//! broadcast to all live connections as a [`PollEvent`].
//!
//! ## Components
//! - `events`: wire envelope for server→client frames
//! - `transport`: read/write seam over the socket halves
//! - `connection`: per-client handle and liveness state
//! - `hub`: connection registry, fan-out and dead-connection sweep
//! - `liveness`: per-connection idle timeout and keepalive probing
//! - `handler`: upgrade endpoint wiring the above together

pub mod connection;
pub mod events;
pub mod handler;
pub mod hub;
pub mod liveness;
pub mod state;
pub mod transport;

// Re-export commonly used items
pub use connection::{ConnectionHandle, ConnectionId, ConnectionState};
pub use events::{EventKind, PollEvent};
pub use hub::{BroadcastReport, ConnectionHub};
pub use liveness::{ExitReason, LivenessProber, ProbeState};
pub use state::AppState;
