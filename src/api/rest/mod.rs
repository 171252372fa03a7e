//! REST API module for HTTP endpoints
//!
//! Poll mutations commit to the store and then publish one event to all
//! WebSocket clients:
//! - `POST /polls` (or `/polls/`) - Create a poll (`new_poll`)
//! - `GET /polls` (or `/polls/`) - List polls with comments
//! - `POST /polls/vote` - Vote for an option (`vote_update`)
//! - `POST /polls/like` - Like a poll (`like_update`)
//! - `POST /polls/comment` - Comment on a poll (`new_comment`)
//! - `POST /polls/comment/like` - Like a comment (`comment_like_update`)
//!
//! Operator endpoints:
//! - `GET /connections` - Live WebSocket count after a dead-connection sweep
//! - `GET /stats` - Store totals plus live connection count

pub mod connections;
pub mod polls;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::PollError;

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "NOT_FOUND".to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "BAD_REQUEST".to_string(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "SERVICE_UNAVAILABLE".to_string(),
        }
    }
}

impl IntoResponse for PollError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            PollError::PollNotFound(_) | PollError::CommentNotFound(_) => {
                (StatusCode::NOT_FOUND, Json(ApiError::not_found(message))).into_response()
            }
            PollError::OptionOutOfRange { .. } | PollError::Invalid(_) => {
                (StatusCode::BAD_REQUEST, Json(ApiError::bad_request(message))).into_response()
            }
        }
    }
}

/// JSON body extractor whose rejection uses the [`ApiError`] body
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(reject(rejection)),
        }
    }
}

fn reject(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::bad_request(rejection.body_text())),
    )
}
