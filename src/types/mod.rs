//! Data types for the QuickPoll server
//!
//! Polls and comments as held by the poll store and returned by the REST API.

mod comment;
mod poll;

pub use comment::Comment;
pub use poll::{NewPoll, Poll, PollView};

/// Result type for the server binary
pub type ServerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
