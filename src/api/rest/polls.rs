//! Poll endpoints
//!
//! Each mutation follows the same contract: commit to the store, then
//! publish exactly one event. Delivery problems never change the response.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ApiJson;
use crate::api::websocket::events::PollEvent;
use crate::api::websocket::state::AppState;
use crate::error::PollError;
use crate::types::{NewPoll, PollView};

/// Response carrying the id of a created record
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

/// Response for mutations that return no data
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub poll_id: i64,
    pub option_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub poll_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub poll_id: i64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentLikeRequest {
    pub comment_id: i64,
}

/// POST /polls - Create a poll
pub async fn create_poll(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<NewPoll>,
) -> Result<Json<Created>, PollError> {
    let poll = state.polls.create_poll(body)?;
    debug!(poll_id = poll.id, "poll created");

    state.publish(PollEvent::NewPoll { poll_id: poll.id }).await;
    Ok(Json(Created { id: poll.id }))
}

/// GET /polls - List polls newest first
pub async fn list_polls(State(state): State<Arc<AppState>>) -> Json<Vec<PollView>> {
    Json(state.polls.list_polls())
}

/// POST /polls/vote - Vote for an option
pub async fn vote(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<VoteRequest>,
) -> Result<Json<Success>, PollError> {
    let votes = state.polls.vote(body.poll_id, body.option_index)?;

    state
        .publish(PollEvent::VoteUpdate {
            poll_id: body.poll_id,
            votes,
        })
        .await;
    Ok(Success::ok())
}

/// POST /polls/like - Like a poll
pub async fn like_poll(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<LikeRequest>,
) -> Result<Json<Success>, PollError> {
    let likes = state.polls.like_poll(body.poll_id)?;

    state
        .publish(PollEvent::LikeUpdate {
            poll_id: body.poll_id,
            likes,
        })
        .await;
    Ok(Success::ok())
}

/// POST /polls/comment - Comment on a poll
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CommentRequest>,
) -> Result<Json<Created>, PollError> {
    let comment = state.polls.add_comment(body.poll_id, body.text)?;
    let id = comment.id;

    state
        .publish(PollEvent::NewComment {
            poll_id: body.poll_id,
            comment,
        })
        .await;
    Ok(Json(Created { id }))
}

/// POST /polls/comment/like - Like a comment
pub async fn like_comment(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CommentLikeRequest>,
) -> Result<Json<Success>, PollError> {
    let comment = state.polls.like_comment(body.comment_id)?;

    state
        .publish(PollEvent::CommentLikeUpdate {
            comment_id: comment.id,
            poll_id: comment.poll_id,
            likes: comment.likes,
        })
        .await;
    Ok(Success::ok())
}
