//! Info repository.

use std::sync::Arc;

use chrono::Utc;
use domus_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Order, QueryOrder, Set};

use crate::entities::{info, Info};

/// Repository for building info records.
#[derive(Clone)]
pub struct InfoRepository {
    db: Arc<DatabaseConnection>,
}

impl InfoRepository {
    /// Create a new info repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create an info record.
    pub async fn create(&self, id: String, title: String, text: String) -> AppResult<info::Model> {
        info::ActiveModel {
            id: Set(id),
            title: Set(title),
            text: Set(text),
            created_at: Set(Utc::now().fixed_offset()),
            updated_at: Set(None),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an info record by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<info::Model>> {
        Info::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an info record by ID, returning an error when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<info::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Info not found: {id}")))
    }

    /// List all info records, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<info::Model>> {
        Info::find()
            .order_by(info::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an info record's title and/or text.
    pub async fn update(
        &self,
        id: &str,
        title: Option<String>,
        text: Option<String>,
    ) -> AppResult<info::Model> {
        let found = self.get_by_id(id).await?;

        let mut active: info::ActiveModel = found.into();
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(text) = text {
            active.text = Set(text);
        }
        active.updated_at = Set(Some(Utc::now().fixed_offset()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an info record.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Info::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
