//! Own-profile endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use domus_common::AppResult;
use domus_db::entities::profile;
use serde::Serialize;

use crate::{extractors::AuthCaller, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile))
        .route("/", put(update_profile))
}

/// Profile response. The password hash never leaves the service layer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub is_manager: bool,
    pub photo_id: Option<String>,
}

impl From<profile::Model> for ProfileResponse {
    fn from(p: profile::Model) -> Self {
        Self {
            user_id: p.user_id,
            first_name: p.first_name,
            last_name: p.last_name,
            email: p.email,
            phone_number: p.phone_number,
            is_manager: p.is_manager,
            photo_id: p.photo_id,
        }
    }
}

/// Read the caller's own profile.
async fn get_profile(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.user_service.get_own_profile(&caller).await?;

    Ok(ApiResponse::ok(ProfileResponse::from(profile)))
}

/// Update the caller's own profile fields.
async fn update_profile(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Json(req): Json<domus_core::user::UpdateProfileInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.user_service.update_own_profile(&caller, req).await?;

    Ok(ApiResponse::ok(ProfileResponse::from(profile)))
}
