//! Poll store - in-memory data engine behind the REST API
//!
//! Every mutation commits under the write lock and returns the committed
//! values, which the REST layer then publishes to WebSocket clients.

mod crud;
mod query;

use parking_lot::RwLock;
use serde::Serialize;

use crate::error::PollError;
use crate::types::{Comment, NewPoll, Poll, PollView};

/// Store contents, guarded by a single lock
#[derive(Debug, Default)]
pub(crate) struct PollData {
    pub(crate) polls: Vec<Poll>,
    pub(crate) comments: Vec<Comment>,
    pub(crate) last_poll_id: i64,
    pub(crate) last_comment_id: i64,
}

/// Aggregate counters for `GET /stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_polls: usize,
    pub total_votes: i64,
    pub total_comments: usize,
}

/// Thread-safe in-memory poll store
#[derive(Debug, Default)]
pub struct PollStore {
    pub(crate) data: RwLock<PollData>,
}

impl PollStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Re-export operations from submodules
impl PollStore {
    // Mutations (from crud.rs)
    pub fn create_poll(&self, poll: NewPoll) -> Result<Poll, PollError> {
        crud::create_poll(self, poll)
    }

    pub fn vote(&self, poll_id: i64, option_index: usize) -> Result<Vec<i64>, PollError> {
        crud::vote(self, poll_id, option_index)
    }

    pub fn like_poll(&self, poll_id: i64) -> Result<i64, PollError> {
        crud::like_poll(self, poll_id)
    }

    pub fn add_comment(&self, poll_id: i64, text: String) -> Result<Comment, PollError> {
        crud::add_comment(self, poll_id, text)
    }

    pub fn like_comment(&self, comment_id: i64) -> Result<Comment, PollError> {
        crud::like_comment(self, comment_id)
    }

    // Queries (from query.rs)
    pub fn list_polls(&self) -> Vec<PollView> {
        query::list_polls(self)
    }

    pub fn get_poll(&self, poll_id: i64) -> Option<Poll> {
        query::get_poll(self, poll_id)
    }

    pub fn stats(&self) -> StoreStats {
        query::stats(self)
    }
}
