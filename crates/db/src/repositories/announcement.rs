//! Announcement repository.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use domus_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, Set,
    TransactionTrait,
    sea_query::{Expr, IntoCondition, extension::postgres::PgExpr},
};

use super::escape_like;
use crate::entities::{
    announcement::{self, AnnouncementCategory},
    inquiry, Announcement, Inquiry,
};

/// Partial update for an announcement. `None` leaves the field untouched;
/// `auto_invisible_date` takes a double-`Option` so the window can be cleared.
#[derive(Debug, Default)]
pub struct AnnouncementChange {
    pub title: Option<String>,
    pub text: Option<String>,
    pub category: Option<AnnouncementCategory>,
    pub is_visible: Option<bool>,
    pub auto_invisible_date: Option<Option<NaiveDate>>,
}

/// Repository for announcement operations.
#[derive(Clone)]
pub struct AnnouncementRepository {
    db: Arc<DatabaseConnection>,
}

impl AnnouncementRepository {
    /// Create a new announcement repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create an announcement: inquiry row plus detail row, atomically.
    pub async fn create(
        &self,
        id: String,
        title: String,
        text: String,
        creator_id: Option<String>,
        category: AnnouncementCategory,
        auto_invisible_date: Option<NaiveDate>,
    ) -> AppResult<(inquiry::Model, announcement::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let base = inquiry::ActiveModel {
            id: Set(id.clone()),
            title: Set(title),
            text: Set(text),
            creator_id: Set(creator_id),
            created_at: Set(Utc::now().fixed_offset()),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let detail = announcement::ActiveModel {
            inquiry_id: Set(id),
            is_visible: Set(true),
            auto_invisible_date: Set(auto_invisible_date),
            category: Set(category),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((base, detail))
    }

    /// Find an announcement by inquiry ID.
    pub async fn find_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<(inquiry::Model, announcement::Model)>> {
        let found = Announcement::find_by_id(id)
            .find_also_related(Inquiry)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(found.and_then(|(detail, base)| base.map(|b| (b, detail))))
    }

    /// Get an announcement by inquiry ID, returning an error when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<(inquiry::Model, announcement::Model)> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Announcement not found: {id}")))
    }

    /// List all announcements, newest first, optionally filtered by a
    /// case-insensitive title substring. Per-caller visibility is applied
    /// by the service at read time.
    pub async fn find_all(
        &self,
        title: Option<&str>,
    ) -> AppResult<Vec<(inquiry::Model, announcement::Model)>> {
        let mut query = Announcement::find().find_also_related(Inquiry);

        if let Some(title) = title {
            let pattern = format!("%{}%", escape_like(title));
            query = query.filter(
                Expr::col((inquiry::Entity, inquiry::Column::Title))
                    .ilike(pattern)
                    .into_condition(),
            );
        }

        let rows = query
            .order_by(inquiry::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(detail, base)| base.map(|b| (b, detail)))
            .collect())
    }

    /// Apply a partial update to an announcement's base and detail rows.
    pub async fn update(
        &self,
        id: &str,
        change: AnnouncementChange,
    ) -> AppResult<(inquiry::Model, announcement::Model)> {
        let (base, detail) = self.get_by_id(id).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut base_active: inquiry::ActiveModel = base.into();
        if let Some(title) = change.title {
            base_active.title = Set(title);
        }
        if let Some(text) = change.text {
            base_active.text = Set(text);
        }
        base_active.updated_at = Set(Some(Utc::now().fixed_offset()));

        let base = base_active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut detail_active: announcement::ActiveModel = detail.into();
        if let Some(category) = change.category {
            detail_active.category = Set(category);
        }
        if let Some(is_visible) = change.is_visible {
            detail_active.is_visible = Set(is_visible);
        }
        if let Some(date) = change.auto_invisible_date {
            detail_active.auto_invisible_date = Set(date);
        }

        let detail = detail_active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((base, detail))
    }

    /// Delete an announcement. The detail row cascades with the inquiry.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Inquiry::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_base(id: &str, title: &str) -> inquiry::Model {
        inquiry::Model {
            id: id.to_string(),
            title: title.to_string(),
            text: "text".to_string(),
            creator_id: Some("mgr".to_string()),
            created_at: Utc::now().fixed_offset(),
            updated_at: None,
        }
    }

    fn test_detail(id: &str, is_visible: bool) -> announcement::Model {
        announcement::Model {
            inquiry_id: id.to_string(),
            is_visible,
            auto_invisible_date: None,
            category: AnnouncementCategory::Other,
        }
    }

    #[tokio::test]
    async fn test_find_all_joins_base_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    (test_detail("a1", true), test_base("a1", "Water shutoff")),
                    (test_detail("a2", false), test_base("a2", "Garage sale")),
                ]])
                .into_connection(),
        );

        let repo = AnnouncementRepository::new(db);
        let results = repo.find_all(Some("a")).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.title, "Water shutoff");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<(announcement::Model, inquiry::Model)>::new()])
                .into_connection(),
        );

        let repo = AnnouncementRepository::new(db);
        let err = repo.get_by_id("missing").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_targets_base_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = AnnouncementRepository::new(db);
        assert!(repo.delete("a1").await.is_ok());
    }
}
