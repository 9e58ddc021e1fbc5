//! Comment repository.

use std::sync::Arc;

use chrono::Utc;
use domus_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::{comment, Comment, Inquiry};

/// Repository for comment operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Add a comment under an inquiry. The inquiry must exist.
    pub async fn create(
        &self,
        id: String,
        inquiry_id: String,
        text: String,
        creator_id: Option<String>,
    ) -> AppResult<comment::Model> {
        let exists = Inquiry::find_by_id(&inquiry_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if exists.is_none() {
            return Err(AppError::NotFound(format!("Inquiry not found: {inquiry_id}")));
        }

        comment::ActiveModel {
            id: Set(id),
            inquiry_id: Set(inquiry_id),
            text: Set(text),
            creator_id: Set(creator_id),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether an inquiry row with this ID exists, of any kind.
    pub async fn inquiry_exists(&self, inquiry_id: &str) -> AppResult<bool> {
        let found = Inquiry::find_by_id(inquiry_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List comments under an inquiry, oldest first.
    pub async fn find_by_inquiry(&self, inquiry_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::InquiryId.eq(inquiry_id))
            .order_by(comment::Column::CreatedAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::inquiry;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_comment(id: &str, inquiry_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            inquiry_id: inquiry_id.to_string(),
            text: "On it".to_string(),
            creator_id: Some("u1".to_string()),
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_missing_inquiry() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<inquiry::Model>::new()])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let err = repo
            .create("c1".to_string(), "missing".to_string(), "hi".to_string(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_by_inquiry_returns_thread() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_comment("c1", "i1"), test_comment("c2", "i1")]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let thread = repo.find_by_inquiry("i1").await.unwrap();

        assert_eq!(thread.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_succeeds() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        assert!(repo.delete("c1").await.is_ok());
    }
}
