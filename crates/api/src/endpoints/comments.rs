//! Comment endpoints. Comments hang off an inquiry and follow its
//! kind-specific policy.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use domus_common::AppResult;
use domus_core::comment::CreateCommentInput;
use domus_db::entities::comment;
use serde::Serialize;

use crate::{extractors::AuthCaller, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{inquiry_id}", get(list_comments))
        .route("/{inquiry_id}", post(create_comment))
}

/// Comment response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub inquiry_id: String,
    pub text: String,
    pub creator_id: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            inquiry_id: c.inquiry_id,
            text: c.text,
            creator_id: c.creator_id,
            created_at: c.created_at,
        }
    }
}

/// List the comment thread under an inquiry, oldest first.
async fn list_comments(
    AuthCaller(_caller): AuthCaller,
    State(state): State<AppState>,
    Path(inquiry_id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state.comment_service.list(&inquiry_id).await?;

    Ok(ApiResponse::ok(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}

/// Post a comment under an inquiry.
async fn create_comment(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(inquiry_id): Path<String>,
    Json(req): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .create(&caller, &inquiry_id, req)
        .await?;

    Ok(ApiResponse::ok(CommentResponse::from(comment)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_comment_response_serialization() {
        let model = comment::Model {
            id: "c1".to_string(),
            inquiry_id: "a1".to_string(),
            text: "Thanks for the heads-up".to_string(),
            creator_id: Some("u2".to_string()),
            created_at: Utc::now().fixed_offset(),
        };

        let json = serde_json::to_string(&CommentResponse::from(model)).unwrap();
        assert!(json.contains("\"inquiryId\":\"a1\""));
        assert!(json.contains("\"creatorId\":\"u2\""));
    }
}
