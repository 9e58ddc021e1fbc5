//! Notification repository.

use std::sync::Arc;

use chrono::Utc;
use domus_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    Set, TransactionTrait,
    sea_query::{Expr, IntoCondition, extension::postgres::PgExpr},
};

use super::escape_like;
use crate::entities::{
    inquiry,
    notification::{self, NotificationCategory},
    Inquiry, Notification,
};

/// Repository for notification operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a notification: inquiry row plus detail row, atomically.
    pub async fn create(
        &self,
        id: String,
        title: String,
        text: String,
        creator_id: Option<String>,
        recipient_id: String,
        category: NotificationCategory,
    ) -> AppResult<(inquiry::Model, notification::Model)> {
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

        let detail = notification::ActiveModel {
            inquiry_id: Set(id),
            recipient_id: Set(recipient_id),
            is_read: Set(false),
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

    /// Find a notification by inquiry ID.
    pub async fn find_by_id(
        &self,
        id: &str,
    ) -> AppResult<Option<(inquiry::Model, notification::Model)>> {
        let found = Notification::find_by_id(id)
            .find_also_related(Inquiry)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(found.and_then(|(detail, base)| base.map(|b| (b, detail))))
    }

    /// Get a notification by inquiry ID, returning an error when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<(inquiry::Model, notification::Model)> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification not found: {id}")))
    }

    /// List notifications addressed to a user, newest first, optionally
    /// filtered by a case-insensitive title substring.
    pub async fn find_for_recipient(
        &self,
        recipient_id: &str,
        title: Option<&str>,
    ) -> AppResult<Vec<(inquiry::Model, notification::Model)>> {
        let mut query = Notification::find()
            .find_also_related(Inquiry)
            .filter(notification::Column::RecipientId.eq(recipient_id));

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

    /// Mark a notification read and refresh the base record's updated
    /// timestamp, atomically.
    pub async fn mark_read(&self, id: &str) -> AppResult<(inquiry::Model, notification::Model)> {
        let (base, detail) = self.get_by_id(id).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut base_active: inquiry::ActiveModel = base.into();
        base_active.updated_at = Set(Some(Utc::now().fixed_offset()));
        let base = base_active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut active: notification::ActiveModel = detail.into();
        active.is_read = Set(true);
        let detail = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((base, detail))
    }

}
