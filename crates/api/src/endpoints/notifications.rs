//! Notification endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use domus_common::AppResult;
use domus_core::notification::CreateNotificationInput;
use domus_db::entities::{
    inquiry,
    notification::{self, NotificationCategory},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{extractors::AuthCaller, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/", post(create_notification))
        .route("/{id}", get(get_notification))
        .route("/{id}/read", post(mark_read))
}

/// Notification response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub title: String,
    pub text: String,
    pub creator_id: Option<String>,
    pub recipient_id: String,
    pub is_read: bool,
    pub category: NotificationCategory,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl From<(inquiry::Model, notification::Model)> for NotificationResponse {
    fn from((base, detail): (inquiry::Model, notification::Model)) -> Self {
        Self {
            id: base.id,
            title: base.title,
            text: base.text,
            creator_id: base.creator_id,
            recipient_id: detail.recipient_id,
            is_read: detail.is_read,
            category: detail.category,
            created_at: base.created_at,
            updated_at: base.updated_at,
        }
    }
}

/// List notifications query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsQuery {
    pub title: Option<String>,
}

/// List the caller's notifications.
async fn list_notifications(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<ApiResponse<Vec<NotificationResponse>>> {
    let notifications = state
        .notification_service
        .list(&caller, query.title.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// Issue a notification to a resident. Manager only.
async fn create_notification(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Json(req): Json<CreateNotificationInput>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let created = state.notification_service.create(&caller, req).await?;

    info!(caller_id = %caller.id, notification_id = %created.0.id, "Issued notification");

    Ok(ApiResponse::ok(NotificationResponse::from(created)))
}

/// Get one notification. Recipient only.
async fn get_notification(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let notification = state.notification_service.get(&caller, &id).await?;

    Ok(ApiResponse::ok(NotificationResponse::from(notification)))
}

/// Mark a notification read. Recipient only.
async fn mark_read(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let notification = state.notification_service.mark_read(&caller, &id).await?;

    Ok(ApiResponse::ok(NotificationResponse::from(notification)))
}
