//! Comment types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment attached to a poll
///
/// The serialized form doubles as the `comment` field of `new_comment` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(skip)]
    pub poll_id: i64,
    pub text: String,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(id: i64, poll_id: i64, text: String) -> Self {
        Self {
            id,
            poll_id,
            text,
            likes: 0,
            created_at: Utc::now(),
        }
    }
}
