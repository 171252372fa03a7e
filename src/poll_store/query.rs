//! Read operations for the poll store

use crate::types::{Poll, PollView};

use super::{PollStore, StoreStats};

/// All polls newest first, each with its comments newest first
pub fn list_polls(store: &PollStore) -> Vec<PollView> {
    let data = store.data.read();

    // Ids are assigned in creation order, so reverse insertion order is newest first
    data.polls
        .iter()
        .rev()
        .map(|poll| PollView {
            poll: poll.clone(),
            comments: data
                .comments
                .iter()
                .rev()
                .filter(|c| c.poll_id == poll.id)
                .cloned()
                .collect(),
        })
        .collect()
}

pub fn get_poll(store: &PollStore, poll_id: i64) -> Option<Poll> {
    store.data.read().polls.iter().find(|p| p.id == poll_id).cloned()
}

pub fn stats(store: &PollStore) -> StoreStats {
    let data = store.data.read();
    StoreStats {
        total_polls: data.polls.len(),
        total_votes: data.polls.iter().map(Poll::total_votes).sum(),
        total_comments: data.comments.len(),
    }
}
