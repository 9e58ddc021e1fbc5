//! Attachment repository.

use std::sync::Arc;

use chrono::Utc;
use domus_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::{attachment, Attachment};

/// Repository for attachment metadata. File bytes live in the storage
/// backend; this table records ownership and content facts.
#[derive(Clone)]
pub struct AttachmentRepository {
    db: Arc<DatabaseConnection>,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record an uploaded file.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        id: String,
        owner_id: String,
        name: String,
        content_type: String,
        size: i64,
        storage_key: String,
        md5: String,
    ) -> AppResult<attachment::Model> {
        attachment::ActiveModel {
            id: Set(id),
            owner_id: Set(owner_id),
            name: Set(name),
            content_type: Set(content_type),
            size: Set(size),
            storage_key: Set(storage_key),
            md5: Set(md5),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an attachment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<attachment::Model>> {
        Attachment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an attachment by ID, returning an error when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<attachment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attachment not found: {id}")))
    }

    /// List a user's attachments, newest first.
    pub async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<attachment::Model>> {
        Attachment::find()
            .filter(attachment::Column::OwnerId.eq(owner_id))
            .order_by(attachment::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an attachment record.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Attachment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_attachment(id: &str, owner_id: &str) -> attachment::Model {
        attachment::Model {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            name: "invoice.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size: 2048,
            storage_key: format!("{owner_id}/{id}.pdf"),
            md5: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn test_find_by_owner_lists_files() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_attachment("f1", "u1"), test_attachment("f2", "u1")]])
                .into_connection(),
        );

        let repo = AttachmentRepository::new(db);
        let files = repo.find_by_owner("u1").await.unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.owner_id == "u1"));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<attachment::Model>::new()])
                .into_connection(),
        );

        let repo = AttachmentRepository::new(db);
        let err = repo.get_by_id("missing").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
