//! User administration endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use chrono::{DateTime, FixedOffset};
use domus_common::AppResult;
use domus_core::user::UserWithProfile;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{extractors::AuthCaller, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}/role", put(set_role))
}

/// User response for the admin listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub is_manager: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<UserWithProfile> for UserResponse {
    fn from(row: UserWithProfile) -> Self {
        let (first_name, last_name, email, phone_number, is_manager) =
            row.profile.map_or((None, None, None, None, false), |p| {
                (
                    p.first_name,
                    p.last_name,
                    p.email,
                    p.phone_number,
                    p.is_manager,
                )
            });

        Self {
            id: row.user.id,
            username: row.user.username,
            first_name,
            last_name,
            email,
            phone_number,
            is_manager,
            created_at: row.user.created_at,
        }
    }
}

/// List all users. Manager only.
async fn list_users(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.user_service.list(&caller).await?;

    Ok(ApiResponse::ok(
        users.into_iter().map(UserResponse::from).collect(),
    ))
}

/// Role change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleRequest {
    pub is_manager: bool,
}

/// Grant or revoke the manager role. Manager only.
async fn set_role(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> AppResult<ApiResponse<()>> {
    info!(caller_id = %caller.id, target_id = %id, is_manager = req.is_manager, "Changing role");

    state
        .user_service
        .set_manager(&caller, &id, req.is_manager)
        .await?;

    Ok(ApiResponse::ok(()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_user_response_serialization() {
        let response = UserResponse {
            id: "u1".to_string(),
            username: "alice".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
            email: None,
            phone_number: None,
            is_manager: true,
            created_at: Utc::now().fixed_offset(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"isManager\":true"));
        assert!(json.contains("\"firstName\":\"Alice\""));
    }
}
