//! Announcement endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use domus_common::AppResult;
use domus_core::announcement::{CreateAnnouncementInput, UpdateAnnouncementInput};
use domus_db::entities::{
    announcement::{self, AnnouncementCategory},
    inquiry,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{extractors::AuthCaller, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_announcements))
        .route("/", post(create_announcement))
        .route("/{id}", get(get_announcement))
        .route("/{id}", put(update_announcement))
        .route("/{id}", delete(delete_announcement))
}

/// Announcement response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementResponse {
    pub id: String,
    pub title: String,
    pub text: String,
    pub creator_id: Option<String>,
    pub category: AnnouncementCategory,
    pub is_visible: bool,
    pub auto_invisible_date: Option<NaiveDate>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl From<(inquiry::Model, announcement::Model)> for AnnouncementResponse {
    fn from((base, detail): (inquiry::Model, announcement::Model)) -> Self {
        Self {
            id: base.id,
            title: base.title,
            text: base.text,
            creator_id: base.creator_id,
            category: detail.category,
            is_visible: detail.is_visible,
            auto_invisible_date: detail.auto_invisible_date,
            created_at: base.created_at,
            updated_at: base.updated_at,
        }
    }
}

/// List announcements query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAnnouncementsQuery {
    pub title: Option<String>,
}

/// List announcements visible to the caller.
async fn list_announcements(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Query(query): Query<ListAnnouncementsQuery>,
) -> AppResult<ApiResponse<Vec<AnnouncementResponse>>> {
    let announcements = state
        .announcement_service
        .list(&caller, query.title.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        announcements
            .into_iter()
            .map(AnnouncementResponse::from)
            .collect(),
    ))
}

/// Publish an announcement.
async fn create_announcement(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Json(req): Json<CreateAnnouncementInput>,
) -> AppResult<ApiResponse<AnnouncementResponse>> {
    let created = state.announcement_service.create(&caller, req).await?;

    info!(caller_id = %caller.id, announcement_id = %created.0.id, "Created announcement");

    Ok(ApiResponse::ok(AnnouncementResponse::from(created)))
}

/// Get a single announcement.
async fn get_announcement(
    AuthCaller(_caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AnnouncementResponse>> {
    let announcement = state.announcement_service.get(&id).await?;

    Ok(ApiResponse::ok(AnnouncementResponse::from(announcement)))
}

/// Update an announcement. Creator only.
async fn update_announcement(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAnnouncementInput>,
) -> AppResult<ApiResponse<AnnouncementResponse>> {
    let updated = state
        .announcement_service
        .update(&caller, &id, req)
        .await?;

    Ok(ApiResponse::ok(AnnouncementResponse::from(updated)))
}

/// Delete an announcement. Creator only.
async fn delete_announcement(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    info!(caller_id = %caller.id, announcement_id = %id, "Deleting announcement");

    state.announcement_service.delete(&caller, &id).await?;

    Ok(ApiResponse::ok(()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_announcement_response_serialization() {
        let base = inquiry::Model {
            id: "a1".to_string(),
            title: "Water shutoff".to_string(),
            text: "Tuesday 9-12".to_string(),
            creator_id: Some("u1".to_string()),
            created_at: Utc::now().fixed_offset(),
            updated_at: None,
        };
        let detail = announcement::Model {
            inquiry_id: "a1".to_string(),
            is_visible: true,
            auto_invisible_date: NaiveDate::from_ymd_opt(2026, 9, 30),
            category: AnnouncementCategory::UtilityOutage,
        };

        let json = serde_json::to_string(&AnnouncementResponse::from((base, detail))).unwrap();
        assert!(json.contains("\"isVisible\":true"));
        assert!(json.contains("\"autoInvisibleDate\":\"2026-09-30\""));
    }
}
