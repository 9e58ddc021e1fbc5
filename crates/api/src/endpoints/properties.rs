//! Property registry endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use domus_common::AppResult;
use domus_core::property::{CreatePropertyInput, UpdatePropertyInput};
use domus_db::entities::{ownership, property};
use serde::Deserialize;
use tracing::info;

use crate::{extractors::AuthCaller, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_properties))
        .route("/", post(create_property))
        .route("/mine", get(list_my_properties))
        .route("/{id}", get(get_property))
        .route("/{id}", put(update_property))
        .route("/{id}", delete(delete_property))
        .route("/{id}/owners", get(list_owners))
        .route("/{id}/owners", post(add_owner))
        .route("/{id}/owners/{owner_id}", delete(remove_owner))
}

/// List all properties.
async fn list_properties(
    AuthCaller(_caller): AuthCaller,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<property::Model>>> {
    let properties = state.property_service.list().await?;

    Ok(ApiResponse::ok(properties))
}

/// List the properties the caller owns.
async fn list_my_properties(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<property::Model>>> {
    let properties = state.property_service.list_mine(&caller).await?;

    Ok(ApiResponse::ok(properties))
}

/// Register a property. Manager only.
async fn create_property(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Json(req): Json<CreatePropertyInput>,
) -> AppResult<ApiResponse<property::Model>> {
    let property = state.property_service.create(&caller, req).await?;

    info!(caller_id = %caller.id, property_id = %property.id, "Registered property");

    Ok(ApiResponse::ok(property))
}

/// Get one property.
async fn get_property(
    AuthCaller(_caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<property::Model>> {
    let property = state.property_service.get(&id).await?;

    Ok(ApiResponse::ok(property))
}

/// Update a property. Manager only.
async fn update_property(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePropertyInput>,
) -> AppResult<ApiResponse<property::Model>> {
    let property = state.property_service.update(&caller, &id, req).await?;

    Ok(ApiResponse::ok(property))
}

/// Remove a property. Manager only.
async fn delete_property(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    info!(caller_id = %caller.id, property_id = %id, "Removing property");

    state.property_service.delete(&caller, &id).await?;

    Ok(ApiResponse::ok(()))
}

/// List ownership links for a property. Manager only.
async fn list_owners(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<ownership::Model>>> {
    let owners = state.property_service.owners(&caller, &id).await?;

    Ok(ApiResponse::ok(owners))
}

/// Add-owner request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOwnerRequest {
    pub owner_id: String,
}

/// Link an owner to a property. Manager only.
async fn add_owner(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddOwnerRequest>,
) -> AppResult<ApiResponse<ownership::Model>> {
    info!(caller_id = %caller.id, property_id = %id, owner_id = %req.owner_id, "Adding owner");

    let link = state
        .property_service
        .add_owner(&caller, &id, &req.owner_id)
        .await?;

    Ok(ApiResponse::ok(link))
}

/// Unlink an owner from a property. Manager only.
async fn remove_owner(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path((id, owner_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<()>> {
    state
        .property_service
        .remove_owner(&caller, &id, &owner_id)
        .await?;

    Ok(ApiResponse::ok(()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_owner_request_deserialization() {
        let req: AddOwnerRequest = serde_json::from_str("{\"ownerId\":\"u7\"}").unwrap();
        assert_eq!(req.owner_id, "u7");
    }
}
