//! Attachment service: uploads, downloads and replacement.

use std::sync::Arc;

use domus_common::{generate_storage_key, AppError, AppResult, IdGenerator, StorageBackend};
use domus_db::{entities::attachment, repositories::AttachmentRepository};

use super::Caller;

/// Largest accepted upload, in bytes.
const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Attachment service: metadata in the database, bytes in the storage
/// backend.
#[derive(Clone)]
pub struct AttachmentService {
    attachment_repo: AttachmentRepository,
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

impl AttachmentService {
    /// Create a new attachment service.
    #[must_use]
    pub fn new(attachment_repo: AttachmentRepository, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            attachment_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Store an uploaded file and record its metadata.
    pub async fn upload(
        &self,
        caller: &Caller,
        name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> AppResult<attachment::Model> {
        validate_upload(name, &data)?;

        let id = self.id_gen.generate();
        let key = generate_storage_key(&caller.id, &id, name);
        let size = i64::try_from(data.len())
            .map_err(|_| AppError::Validation("File too large".to_string()))?;

        let stored = self.storage.upload(&key, &data, content_type).await?;

        self.attachment_repo
            .create(
                id,
                caller.id.clone(),
                name.to_string(),
                content_type.to_string(),
                size,
                stored.key,
                stored.md5,
            )
            .await
    }

    /// Read an attachment's metadata.
    pub async fn get(&self, id: &str) -> AppResult<attachment::Model> {
        self.attachment_repo.get_by_id(id).await
    }

    /// List the caller's own attachments.
    pub async fn list_mine(&self, caller: &Caller) -> AppResult<Vec<attachment::Model>> {
        self.attachment_repo.find_by_owner(&caller.id).await
    }

    /// Read an attachment's bytes.
    pub async fn download(&self, id: &str) -> AppResult<(attachment::Model, Vec<u8>)> {
        let meta = self.attachment_repo.get_by_id(id).await?;
        let data = self.storage.read(&meta.storage_key).await?;
        Ok((meta, data))
    }

    /// Replace an attachment's content in place. Owner only; the
    /// metadata row keeps its ID so existing references stay valid.
    pub async fn replace(
        &self,
        caller: &Caller,
        id: &str,
        name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> AppResult<attachment::Model> {
        validate_upload(name, &data)?;

        let meta = self.attachment_repo.get_by_id(id).await?;
        if meta.owner_id != caller.id {
            return Err(AppError::Forbidden(
                "Only the owner may replace this file".to_string(),
            ));
        }

        let size = i64::try_from(data.len())
            .map_err(|_| AppError::Validation("File too large".to_string()))?;

        self.storage.delete(&meta.storage_key).await?;
        let key = generate_storage_key(&caller.id, id, name);
        let stored = self.storage.upload(&key, &data, content_type).await?;

        self.attachment_repo.delete(id).await?;
        self.attachment_repo
            .create(
                id.to_string(),
                caller.id.clone(),
                name.to_string(),
                content_type.to_string(),
                size,
                stored.key,
                stored.md5,
            )
            .await
    }

    /// Delete an attachment. Owner only.
    pub async fn delete(&self, caller: &Caller, id: &str) -> AppResult<()> {
        let meta = self.attachment_repo.get_by_id(id).await?;
        if meta.owner_id != caller.id {
            return Err(AppError::Forbidden(
                "Only the owner may delete this file".to_string(),
            ));
        }

        self.storage.delete(&meta.storage_key).await?;
        self.attachment_repo.delete(id).await
    }
}

fn validate_upload(name: &str, data: &[u8]) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("File name is required".to_string()));
    }
    if data.is_empty() {
        return Err(AppError::Validation("File is empty".to_string()));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::Validation("File too large".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_upload_rejects_empty_file() {
        assert!(matches!(
            validate_upload("a.txt", &[]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_upload_rejects_blank_name() {
        assert!(matches!(
            validate_upload("  ", b"data"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_upload_accepts_normal_file() {
        assert!(validate_upload("invoice.pdf", b"%PDF-1.4").is_ok());
    }
}
