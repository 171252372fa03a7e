//! WebSocket event types for real-time poll updates

use serde::{Deserialize, Serialize};

use crate::types::Comment;

/// Events broadcast to WebSocket clients
///
/// Serialized as a flat envelope tagged by `type`, e.g.
/// `{"type":"vote_update","poll_id":42,"votes":[3,1]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PollEvent {
    /// A poll was created
    NewPoll { poll_id: i64 },

    /// A vote was recorded; `votes` is the full tally, one entry per option
    VoteUpdate { poll_id: i64, votes: Vec<i64> },

    /// A poll's like count changed
    LikeUpdate { poll_id: i64, likes: i64 },

    /// A comment was added to a poll
    NewComment { poll_id: i64, comment: Comment },

    /// A comment's like count changed
    CommentLikeUpdate {
        comment_id: i64,
        poll_id: i64,
        likes: i64,
    },

    /// Keepalive probe, or acknowledgment of client input
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

/// Discriminant of a [`PollEvent`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    NewPoll,
    VoteUpdate,
    LikeUpdate,
    NewComment,
    CommentLikeUpdate,
    Ping,
}

impl EventKind {
    /// Wire name used in the `type` field
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::NewPoll => "new_poll",
            EventKind::VoteUpdate => "vote_update",
            EventKind::LikeUpdate => "like_update",
            EventKind::NewComment => "new_comment",
            EventKind::CommentLikeUpdate => "comment_like_update",
            EventKind::Ping => "ping",
        }
    }
}

impl PollEvent {
    /// Keepalive probe sent to idle connections
    pub fn keepalive() -> Self {
        PollEvent::Ping { message: None }
    }

    /// Reply to any inbound client frame
    pub fn ack() -> Self {
        PollEvent::Ping {
            message: Some("connected".to_string()),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            PollEvent::NewPoll { .. } => EventKind::NewPoll,
            PollEvent::VoteUpdate { .. } => EventKind::VoteUpdate,
            PollEvent::LikeUpdate { .. } => EventKind::LikeUpdate,
            PollEvent::NewComment { .. } => EventKind::NewComment,
            PollEvent::CommentLikeUpdate { .. } => EventKind::CommentLikeUpdate,
            PollEvent::Ping { .. } => EventKind::Ping,
        }
    }

    /// Encode as a text frame payload
    pub fn to_wire(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
