//! Poll types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Comment;

/// A poll with its live tally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: i64,
    pub title: String,
    pub options: Vec<String>,
    /// One counter per option, same order as `options`
    pub votes: Vec<i64>,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
}

impl Poll {
    /// Create a poll with a zeroed tally
    pub fn new(id: i64, title: String, options: Vec<String>) -> Self {
        let votes = vec![0; options.len()];
        Self {
            id,
            title,
            options,
            votes,
            likes: 0,
            created_at: Utc::now(),
        }
    }

    /// Sum of all option counters
    pub fn total_votes(&self) -> i64 {
        self.votes.iter().sum()
    }
}

/// Poll as listed by `GET /polls/`, with its comments newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollView {
    #[serde(flatten)]
    pub poll: Poll,
    pub comments: Vec<Comment>,
}

/// Request body for creating a poll
#[derive(Debug, Clone, Deserialize)]
pub struct NewPoll {
    pub title: String,
    pub options: Vec<String>,
}
