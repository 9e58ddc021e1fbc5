//! API middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use domus_core::{
    AnnouncementService, AttachmentService, CommentService, InfoService, NotificationService,
    PollService, PropertyService, TodoService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub todo_service: TodoService,
    pub announcement_service: AnnouncementService,
    pub poll_service: PollService,
    pub notification_service: NotificationService,
    pub comment_service: CommentService,
    pub property_service: PropertyService,
    pub attachment_service: AttachmentService,
    pub info_service: InfoService,
}

/// Authentication middleware.
///
/// Resolves the `Authorization: Bearer` token to a caller identity and
/// stores it in request extensions. Requests without a valid token pass
/// through anonymously; protected routes reject them at extraction time.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        if let Ok(caller) = state.user_service.authenticate_by_token(token).await {
            req.extensions_mut().insert(caller);
        }
    }

    next.run(req).await
}
