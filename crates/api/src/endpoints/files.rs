//! File endpoints: metadata plus upload/download through the storage
//! backend.

use axum::{
    Router,
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::{DateTime, FixedOffset};
use domus_common::{AppError, AppResult};
use domus_db::entities::attachment;
use serde::Serialize;
use tracing::info;

use crate::{extractors::AuthCaller, middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_files))
        .route("/", post(upload_file))
        .route("/{id}", get(get_file))
        .route("/{id}", put(replace_file))
        .route("/{id}", delete(delete_file))
        .route("/{id}/download", get(download_file))
}

/// File metadata response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: i64,
    pub md5: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<attachment::Model> for FileResponse {
    fn from(f: attachment::Model) -> Self {
        Self {
            id: f.id,
            owner_id: f.owner_id,
            name: f.name,
            content_type: f.content_type,
            size: f.size,
            md5: f.md5,
            created_at: f.created_at,
        }
    }
}

/// One file field pulled out of a multipart body.
struct UploadedFile {
    name: String,
    content_type: String,
    data: Vec<u8>,
}

/// Read the `file` field from a multipart form. An explicit `name` field
/// overrides the part's file name.
async fn read_multipart_file(mut multipart: Multipart) -> AppResult<UploadedFile> {
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                if file_name.is_none() {
                    file_name = field.file_name().map(std::string::ToString::to_string);
                }
                content_type = field.content_type().map(std::string::ToString::to_string);
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?
                        .to_vec(),
                );
            }
            "name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !text.is_empty() {
                    file_name = Some(text);
                }
            }
            _ => {}
        }
    }

    let data = file_data.ok_or_else(|| AppError::BadRequest("Missing file field".to_string()))?;
    let name =
        file_name.ok_or_else(|| AppError::BadRequest("Missing file name".to_string()))?;

    Ok(UploadedFile {
        name,
        content_type: content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        data,
    })
}

/// Upload a file via multipart form.
async fn upload_file(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<FileResponse>> {
    let upload = read_multipart_file(multipart).await?;

    info!(caller_id = %caller.id, name = %upload.name, size = upload.data.len(), "Uploading file");

    let meta = state
        .attachment_service
        .upload(&caller, &upload.name, &upload.content_type, upload.data)
        .await?;

    Ok(ApiResponse::ok(FileResponse::from(meta)))
}

/// List the caller's own files.
async fn list_files(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FileResponse>>> {
    let files = state.attachment_service.list_mine(&caller).await?;

    Ok(ApiResponse::ok(
        files.into_iter().map(FileResponse::from).collect(),
    ))
}

/// Get file metadata.
async fn get_file(
    AuthCaller(_caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<FileResponse>> {
    let meta = state.attachment_service.get(&id).await?;

    Ok(ApiResponse::ok(FileResponse::from(meta)))
}

/// Download file content.
async fn download_file(
    AuthCaller(_caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (meta, data) = state.attachment_service.download(&id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, meta.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", meta.name),
            ),
        ],
        data,
    ))
}

/// Replace a file's content in place. Owner only; the file keeps its ID.
async fn replace_file(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<FileResponse>> {
    let upload = read_multipart_file(multipart).await?;

    info!(caller_id = %caller.id, file_id = %id, "Replacing file content");

    let meta = state
        .attachment_service
        .replace(&caller, &id, &upload.name, &upload.content_type, upload.data)
        .await?;

    Ok(ApiResponse::ok(FileResponse::from(meta)))
}

/// Delete a file. Owner only.
async fn delete_file(
    AuthCaller(caller): AuthCaller,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.attachment_service.delete(&caller, &id).await?;

    Ok(ApiResponse::ok(()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_file_response_serialization() {
        let model = attachment::Model {
            id: "f1".to_string(),
            owner_id: "u1".to_string(),
            name: "invoice.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size: 1024,
            storage_key: "u1/f1/invoice.pdf".to_string(),
            md5: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
            created_at: Utc::now().fixed_offset(),
        };

        let json = serde_json::to_string(&FileResponse::from(model)).unwrap();
        assert!(json.contains("\"type\":\"application/pdf\""));
        assert!(json.contains("\"ownerId\":\"u1\""));
        // Storage keys are internal.
        assert!(!json.contains("storage_key"));
        assert!(!json.contains("storageKey"));
    }
}
