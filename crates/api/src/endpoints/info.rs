//! Info endpoints: manager-authored reference records.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use domus_common::AppResult;
use domus_core::info::{CreateInfoInput, UpdateInfoInput};
use domus_db::entities::info;

use crate::{extractors::AuthCaller, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_info))
        .route("/", post(create_info))
        .route("/{id}", get(get_info))
        .route("/{id}", put(update_info))
        .route("/{id}", delete(delete_info))
}

/// List all info records.
async fn list_info(
    AuthCaller(_caller): AuthCaller,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<info::Model>>> {
    let records = state.info_service.list().await?;

    Ok(ApiResponse::ok(records))
}

/// Create an info record. Manager only.
async fn create_info(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Json(req): Json<CreateInfoInput>,
) -> AppResult<ApiResponse<info::Model>> {
    let record = state.info_service.create(&caller, req).await?;

    tracing::info!(caller_id = %caller.id, info_id = %record.id, "Created info record");

    Ok(ApiResponse::ok(record))
}

/// Get one info record.
async fn get_info(
    AuthCaller(_caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<info::Model>> {
    let record = state.info_service.get(&id).await?;

    Ok(ApiResponse::ok(record))
}

/// Update an info record. Manager only.
async fn update_info(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateInfoInput>,
) -> AppResult<ApiResponse<info::Model>> {
    let record = state.info_service.update(&caller, &id, req).await?;

    Ok(ApiResponse::ok(record))
}

/// Delete an info record. Manager only.
async fn delete_info(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    tracing::info!(caller_id = %caller.id, info_id = %id, "Deleting info record");

    state.info_service.delete(&caller, &id).await?;

    Ok(ApiResponse::ok(()))
}
