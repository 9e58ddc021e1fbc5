//! Poll endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use domus_common::AppResult;
use domus_core::poll::{CreatePollInput, PollView};
use domus_db::entities::{inquiry, poll, vote_option};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{extractors::AuthCaller, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_polls))
        .route("/", post(create_poll))
        .route("/{id}", get(get_poll))
        .route("/{id}/vote", post(cast_vote))
}

/// Poll summary response, as returned by the listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSummaryResponse {
    pub id: String,
    pub title: String,
    pub text: String,
    pub creator_id: Option<String>,
    pub deadline: NaiveDate,
    pub preliminary_results: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<(inquiry::Model, poll::Model)> for PollSummaryResponse {
    fn from((base, detail): (inquiry::Model, poll::Model)) -> Self {
        Self {
            id: base.id,
            title: base.title,
            text: base.text,
            creator_id: base.creator_id,
            deadline: detail.deadline,
            preliminary_results: detail.preliminary_results,
            created_at: base.created_at,
        }
    }
}

/// One poll option with its tally. `votes` is absent while results are
/// withheld.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionResponse {
    pub id: String,
    pub text: String,
    pub display_order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<u64>,
}

/// Full poll response with options and the caller's own ballot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: String,
    pub title: String,
    pub text: String,
    pub creator_id: Option<String>,
    pub deadline: NaiveDate,
    pub preliminary_results: bool,
    pub is_closed: bool,
    pub options: Vec<PollOptionResponse>,
    pub own_vote_option_id: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl From<PollView> for PollResponse {
    fn from(view: PollView) -> Self {
        Self {
            id: view.base.id,
            title: view.base.title,
            text: view.base.text,
            creator_id: view.base.creator_id,
            deadline: view.detail.deadline,
            preliminary_results: view.detail.preliminary_results,
            is_closed: view.is_closed,
            options: view
                .options
                .into_iter()
                .map(|o| PollOptionResponse {
                    id: o.option.id,
                    text: o.option.text,
                    display_order: o.option.display_order,
                    votes: o.votes,
                })
                .collect(),
            own_vote_option_id: view.own_vote.map(|v| v.option_id),
            created_at: view.base.created_at,
        }
    }
}

impl From<(inquiry::Model, poll::Model, Vec<vote_option::Model>)> for PollResponse {
    fn from(
        (base, detail, options): (inquiry::Model, poll::Model, Vec<vote_option::Model>),
    ) -> Self {
        Self {
            id: base.id,
            title: base.title,
            text: base.text,
            creator_id: base.creator_id,
            deadline: detail.deadline,
            preliminary_results: detail.preliminary_results,
            is_closed: false,
            options: options
                .into_iter()
                .map(|o| PollOptionResponse {
                    id: o.id,
                    text: o.text,
                    display_order: o.display_order,
                    votes: None,
                })
                .collect(),
            own_vote_option_id: None,
            created_at: base.created_at,
        }
    }
}

/// List all polls.
async fn list_polls(
    AuthCaller(_caller): AuthCaller,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<PollSummaryResponse>>> {
    let polls = state.poll_service.list().await?;

    Ok(ApiResponse::ok(
        polls.into_iter().map(PollSummaryResponse::from).collect(),
    ))
}

/// Open a poll with its options.
async fn create_poll(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Json(req): Json<CreatePollInput>,
) -> AppResult<ApiResponse<PollResponse>> {
    let created = state.poll_service.create(&caller, req).await?;

    info!(caller_id = %caller.id, poll_id = %created.0.id, "Created poll");

    Ok(ApiResponse::ok(PollResponse::from(created)))
}

/// Get one poll with options, tallies and the caller's own ballot.
async fn get_poll(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PollResponse>> {
    let view = state.poll_service.get(&caller, &id).await?;

    Ok(ApiResponse::ok(PollResponse::from(view)))
}

/// Vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub option_id: String,
}

/// Cast a ballot. One per caller per poll.
async fn cast_vote(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<ApiResponse<()>> {
    info!(caller_id = %caller.id, poll_id = %id, "Casting vote");

    state.poll_service.vote(&caller, &id, &req.option_id).await?;

    Ok(ApiResponse::ok(()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domus_core::poll::OptionWithCount;
    use domus_db::entities::vote_option;

    fn view_with_votes(votes: Option<u64>) -> PollView {
        PollView {
            base: inquiry::Model {
                id: "p1".to_string(),
                title: "Repaint the lobby?".to_string(),
                text: "Colour options below".to_string(),
                creator_id: Some("u1".to_string()),
                created_at: Utc::now().fixed_offset(),
                updated_at: None,
            },
            detail: poll::Model {
                inquiry_id: "p1".to_string(),
                deadline: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
                preliminary_results: false,
            },
            options: vec![OptionWithCount {
                option: vote_option::Model {
                    id: "o1".to_string(),
                    poll_id: "p1".to_string(),
                    text: "White".to_string(),
                    display_order: 0,
                },
                votes,
            }],
            own_vote: None,
            is_closed: false,
        }
    }

    #[test]
    fn test_poll_response_withholds_tallies() {
        let json = serde_json::to_string(&PollResponse::from(view_with_votes(None))).unwrap();
        assert!(!json.contains("\"votes\""));
    }

    #[test]
    fn test_created_poll_response_lists_options_without_tallies() {
        let view = view_with_votes(None);
        let options = vec![view.options[0].option.clone()];
        let response = PollResponse::from((view.base, view.detail, options));

        assert_eq!(response.options.len(), 1);
        assert_eq!(response.options[0].text, "White");
        assert!(!response.is_closed);

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("\"votes\""));
    }

    #[test]
    fn test_poll_response_includes_tallies() {
        let json = serde_json::to_string(&PollResponse::from(view_with_votes(Some(3)))).unwrap();
        assert!(json.contains("\"votes\":3"));
    }
}
