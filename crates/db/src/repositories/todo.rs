//! Todo repository.
//!
//! Todos are stored as an inquiry row plus a todo detail row. Creation and
//! updates touch both tables inside one transaction; status transitions
//! re-check the guard against freshly read state so concurrent writers
//! cannot skip a step.

use std::sync::Arc;

use chrono::Utc;
use domus_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    Set, TransactionTrait,
    sea_query::{Expr, IntoCondition, extension::postgres::PgExpr},
};

use crate::entities::{
    inquiry,
    todo::{self, TodoCategory, TodoPriority, TodoStatus},
    Inquiry, Todo,
};

use super::escape_like;

/// Listing filter. All fields are conjunctive; `title` matches
/// case-insensitively on any substring. `creator_id` scopes the listing
/// to one creator (non-manager view).
#[derive(Debug, Default, Clone)]
pub struct TodoFilter {
    pub title: Option<String>,
    pub status: Option<TodoStatus>,
    pub category: Option<TodoCategory>,
    pub assignee_id: Option<String>,
    pub creator_id: Option<String>,
}

/// Partial update for a todo. `None` leaves the field untouched.
#[derive(Debug, Default)]
pub struct TodoChange {
    pub title: Option<String>,
    pub text: Option<String>,
    pub priority: Option<TodoPriority>,
    pub category: Option<TodoCategory>,
    pub assignee_id: Option<Option<String>>,
}

/// Repository for todo operations.
#[derive(Clone)]
pub struct TodoRepository {
    db: Arc<DatabaseConnection>,
}

impl TodoRepository {
    /// Create a new todo repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a todo: inquiry row plus detail row, atomically.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        id: String,
        title: String,
        text: String,
        creator_id: Option<String>,
        priority: TodoPriority,
        category: TodoCategory,
        assignee_id: Option<String>,
    ) -> AppResult<(inquiry::Model, todo::Model)> {
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

        let detail = todo::ActiveModel {
            inquiry_id: Set(id),
            priority: Set(priority),
            status: Set(TodoStatus::New),
            category: Set(category),
            assignee_id: Set(assignee_id),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((base, detail))
    }

    /// Find a todo by inquiry ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<(inquiry::Model, todo::Model)>> {
        let found = Todo::find_by_id(id)
            .find_also_related(Inquiry)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(found.and_then(|(detail, base)| base.map(|b| (b, detail))))
    }

    /// Get a todo by inquiry ID, returning an error when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<(inquiry::Model, todo::Model)> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Todo not found: {id}")))
    }

    /// List todos matching the filter, newest first.
    pub async fn find_all(
        &self,
        filter: &TodoFilter,
    ) -> AppResult<Vec<(inquiry::Model, todo::Model)>> {
        let mut query = Todo::find().find_also_related(Inquiry);

        if let Some(title) = &filter.title {
            let pattern = format!("%{}%", escape_like(title));
            query = query.filter(
                Expr::col((inquiry::Entity, inquiry::Column::Title))
                    .ilike(pattern)
                    .into_condition(),
            );
        }
        if let Some(status) = &filter.status {
            query = query.filter(todo::Column::Status.eq(status.clone()));
        }
        if let Some(category) = &filter.category {
            query = query.filter(todo::Column::Category.eq(category.clone()));
        }
        if let Some(assignee_id) = &filter.assignee_id {
            query = query.filter(todo::Column::AssigneeId.eq(assignee_id));
        }
        if let Some(creator_id) = &filter.creator_id {
            query = query.filter(inquiry::Column::CreatorId.eq(creator_id));
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

    /// Apply a partial update to a todo's base and detail rows.
    pub async fn update(
        &self,
        id: &str,
        change: TodoChange,
    ) -> AppResult<(inquiry::Model, todo::Model)> {
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

        let mut detail_active: todo::ActiveModel = detail.into();
        if let Some(priority) = change.priority {
            detail_active.priority = Set(priority);
        }
        if let Some(category) = change.category {
            detail_active.category = Set(category);
        }
        if let Some(assignee_id) = change.assignee_id {
            detail_active.assignee_id = Set(assignee_id);
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

    /// Move a todo to `next` after re-reading its current state inside a
    /// transaction and passing it through `guard`. The guard decides
    /// whether the step from the fresh state to `next` is allowed.
    /// `assignee` of `None` leaves the assignee untouched; `Some(None)`
    /// clears it.
    pub async fn transition<G>(
        &self,
        id: &str,
        next: TodoStatus,
        assignee: Option<Option<String>>,
        guard: G,
    ) -> AppResult<todo::Model>
    where
        G: FnOnce(&todo::Model) -> AppResult<()> + Send,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let current = Todo::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Todo not found: {id}")))?;

        guard(&current)?;

        let mut active: todo::ActiveModel = current.into();
        active.status = Set(next);
        if let Some(assignee) = assignee {
            active.assignee_id = Set(assignee);
        }

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
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
            creator_id: Some("u1".to_string()),
            created_at: Utc::now().fixed_offset(),
            updated_at: None,
        }
    }

    fn test_detail(id: &str, status: TodoStatus) -> todo::Model {
        todo::Model {
            inquiry_id: id.to_string(),
            priority: TodoPriority::Medium,
            status,
            category: TodoCategory::Plumbing,
            assignee_id: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_joins_base_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(
                    test_detail("t1", TodoStatus::New),
                    test_base("t1", "Leaking pipe"),
                )]])
                .into_connection(),
        );

        let repo = TodoRepository::new(db);
        let (base, detail) = repo.find_by_id("t1").await.unwrap().unwrap();

        assert_eq!(base.title, "Leaking pipe");
        assert_eq!(detail.status, TodoStatus::New);
    }

    #[tokio::test]
    async fn test_find_all_title_filter_matches_case_insensitively() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![(
                    test_detail("t1", TodoStatus::New),
                    test_base("t1", "Leaking pipe"),
                )]])
                .into_connection(),
        );

        let repo = TodoRepository::new(Arc::clone(&db));
        let filter = TodoFilter {
            title: Some("pipe".to_string()),
            ..TodoFilter::default()
        };
        let rows = repo.find_all(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);

        drop(repo);
        let log = Arc::into_inner(db).unwrap().into_transaction_log();
        assert!(format!("{log:?}").contains("ILIKE"));
    }

    #[tokio::test]
    async fn test_transition_applies_guard_to_fresh_state() {
        let fresh = test_detail("t1", TodoStatus::InProgress);
        let updated = test_detail("t1", TodoStatus::InReview);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fresh]])
                .append_query_results([[updated]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = TodoRepository::new(db);
        let result = repo
            .transition("t1", TodoStatus::InReview, None, |current| {
                // Guard sees the state read inside the transaction.
                assert_eq!(current.status, TodoStatus::InProgress);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(result.status, TodoStatus::InReview);
    }

    #[tokio::test]
    async fn test_transition_guard_rejection_aborts() {
        let fresh = test_detail("t1", TodoStatus::Completed);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fresh]])
                .into_connection(),
        );

        let repo = TodoRepository::new(db);
        let err = repo
            .transition("t1", TodoStatus::New, None, |_| {
                Err(AppError::BadRequest("invalid transition".to_string()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_transition_missing_todo() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<todo::Model>::new()])
                .into_connection(),
        );

        let repo = TodoRepository::new(db);
        let err = repo
            .transition("missing", TodoStatus::InProgress, None, |_| Ok(()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_transition_can_clear_assignee() {
        let mut fresh = test_detail("t1", TodoStatus::InReview);
        fresh.assignee_id = Some("worker".to_string());
        let mut done = test_detail("t1", TodoStatus::Completed);
        done.assignee_id = None;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fresh]])
                .append_query_results([[done]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = TodoRepository::new(db);
        let result = repo
            .transition("t1", TodoStatus::Completed, Some(None), |_| Ok(()))
            .await
            .unwrap();

        assert_eq!(result.status, TodoStatus::Completed);
        assert!(result.assignee_id.is_none());
    }
}
