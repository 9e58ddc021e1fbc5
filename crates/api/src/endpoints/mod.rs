//! API endpoints.

mod announcements;
mod auth;
mod comments;
mod files;
mod info;
mod notifications;
mod polls;
mod profile;
mod properties;
mod todos;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/profile", profile::router())
        .nest("/todos", todos::router())
        .nest("/announcements", announcements::router())
        .nest("/polls", polls::router())
        .nest("/notifications", notifications::router())
        .nest("/comments", comments::router())
        .nest("/properties", properties::router())
        .nest("/files", files::router())
        .nest("/info", info::router())
}
