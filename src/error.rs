//! Error types
//!
//! Transport and hub errors never leave the realtime core: they are logged and
//! resolved by retiring the affected connection. Store errors map to HTTP
//! status codes in the REST layer.

use thiserror::Error;

/// Failure on a single client connection
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer is gone or the connection was already retired
    #[error("connection closed")]
    Closed,

    /// A send did not complete within the send timeout
    #[error("send timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Underlying WebSocket error
    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<axum::Error> for TransportError {
    fn from(err: axum::Error) -> Self {
        TransportError::WebSocket(err.to_string())
    }
}

/// Registry errors
#[derive(Debug, Error)]
pub enum HubError {
    #[error("connection limit reached ({limit} live connections)")]
    CapacityReached { limit: usize },
}

/// Poll store errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    #[error("Poll {0} not found")]
    PollNotFound(i64),

    #[error("Comment {0} not found")]
    CommentNotFound(i64),

    #[error("Option index {index} out of range for poll {poll_id} ({options} options)")]
    OptionOutOfRange {
        poll_id: i64,
        index: usize,
        options: usize,
    },

    #[error("{0}")]
    Invalid(String),
}

/// Startup configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}
