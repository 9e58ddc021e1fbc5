//! Todo endpoints: maintenance requests and their lifecycle.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use chrono::{DateTime, FixedOffset};
use domus_common::AppResult;
use domus_core::todo::{CreateTodoInput, ReviewDecision, UpdateTodoInput};
use domus_db::entities::{
    inquiry,
    todo::{self, TodoCategory, TodoPriority, TodoStatus},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{extractors::AuthCaller, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_todos))
        .route("/", post(create_todo))
        .route("/{id}", get(get_todo))
        .route("/{id}", put(update_todo))
        .route("/{id}/assign", post(assign_todo))
        .route("/{id}/send-to-review", post(send_to_review))
        .route("/{id}/review", post(review_todo))
}

/// Todo response: the base record and its detail row flattened together.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: String,
    pub title: String,
    pub text: String,
    pub creator_id: Option<String>,
    pub priority: TodoPriority,
    pub status: TodoStatus,
    pub category: TodoCategory,
    pub assignee_id: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl From<(inquiry::Model, todo::Model)> for TodoResponse {
    fn from((base, detail): (inquiry::Model, todo::Model)) -> Self {
        Self {
            id: base.id,
            title: base.title,
            text: base.text,
            creator_id: base.creator_id,
            priority: detail.priority,
            status: detail.status,
            category: detail.category,
            assignee_id: detail.assignee_id,
            created_at: base.created_at,
            updated_at: base.updated_at,
        }
    }
}

/// List todos query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTodosQuery {
    pub title: Option<String>,
    pub status: Option<TodoStatus>,
    pub category: Option<TodoCategory>,
}

/// List todos. Managers see all; residents see their own.
async fn list_todos(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Query(query): Query<ListTodosQuery>,
) -> AppResult<ApiResponse<Vec<TodoResponse>>> {
    let todos = state
        .todo_service
        .list(&caller, query.title, query.status, query.category)
        .await?;

    Ok(ApiResponse::ok(
        todos.into_iter().map(TodoResponse::from).collect(),
    ))
}

/// File a maintenance request.
async fn create_todo(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Json(req): Json<CreateTodoInput>,
) -> AppResult<ApiResponse<TodoResponse>> {
    let created = state.todo_service.create(&caller, req).await?;

    info!(caller_id = %caller.id, todo_id = %created.0.id, "Created todo");

    Ok(ApiResponse::ok(TodoResponse::from(created)))
}

/// Get one todo. Creator or manager only.
async fn get_todo(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TodoResponse>> {
    let todo = state.todo_service.get(&caller, &id).await?;

    Ok(ApiResponse::ok(TodoResponse::from(todo)))
}

/// Edit descriptive fields. Creator or manager only.
async fn update_todo(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTodoInput>,
) -> AppResult<ApiResponse<TodoResponse>> {
    let updated = state.todo_service.update(&caller, &id, req).await?;

    Ok(ApiResponse::ok(TodoResponse::from(updated)))
}

/// Assign request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTodoRequest {
    pub assignee_id: String,
}

/// Assign the todo to a worker and start progress. Manager only.
async fn assign_todo(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignTodoRequest>,
) -> AppResult<ApiResponse<todo::Model>> {
    info!(caller_id = %caller.id, todo_id = %id, assignee_id = %req.assignee_id, "Assigning todo");

    let detail = state
        .todo_service
        .assign(&caller, &id, req.assignee_id)
        .await?;

    Ok(ApiResponse::ok(detail))
}

/// The assignee hands the todo over for review.
async fn send_to_review(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<todo::Model>> {
    let detail = state.todo_service.send_to_review(&caller, &id).await?;

    Ok(ApiResponse::ok(detail))
}

/// Review request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewTodoRequest {
    pub decision: ReviewDecision,
}

/// The creator accepts or rejects a todo in review.
async fn review_todo(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReviewTodoRequest>,
) -> AppResult<ApiResponse<todo::Model>> {
    info!(caller_id = %caller.id, todo_id = %id, "Reviewing todo");

    let detail = state.todo_service.review(&caller, &id, req.decision).await?;

    Ok(ApiResponse::ok(detail))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_todo_response_serialization() {
        let base = inquiry::Model {
            id: "t1".to_string(),
            title: "Leaky tap".to_string(),
            text: "Kitchen tap drips".to_string(),
            creator_id: Some("u1".to_string()),
            created_at: Utc::now().fixed_offset(),
            updated_at: None,
        };
        let detail = todo::Model {
            inquiry_id: "t1".to_string(),
            priority: TodoPriority::Medium,
            status: TodoStatus::InProgress,
            category: TodoCategory::Plumbing,
            assignee_id: Some("w1".to_string()),
        };

        let json = serde_json::to_string(&TodoResponse::from((base, detail))).unwrap();
        assert!(json.contains("\"status\":\"inProgress\""));
        assert!(json.contains("\"assigneeId\":\"w1\""));
        assert!(json.contains("\"title\":\"Leaky tap\""));
    }

    #[test]
    fn test_review_request_deserialization() {
        let req: ReviewTodoRequest = serde_json::from_str("{\"decision\":\"accept\"}").unwrap();
        assert_eq!(req.decision, ReviewDecision::Accept);
    }
}
