//! Profile repository.

use std::sync::Arc;

use domus_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::{profile, Profile};

/// Partial update for a profile. `None` leaves the field untouched;
/// the double-`Option` fields allow clearing a nullable column.
#[derive(Debug, Default)]
pub struct ProfileChange {
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone_number: Option<Option<String>>,
    pub photo_id: Option<Option<String>>,
    pub password: Option<String>,
}

/// Repository for profile operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by user ID.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a profile by user ID, returning an error when absent.
    pub async fn get_by_user_id(&self, user_id: &str) -> AppResult<profile::Model> {
        self.find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile not found: {user_id}")))
    }

    /// Apply a partial update to a profile.
    pub async fn update(&self, user_id: &str, change: ProfileChange) -> AppResult<profile::Model> {
        let found = self.get_by_user_id(user_id).await?;

        let mut active: profile::ActiveModel = found.into();

        if let Some(first_name) = change.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = change.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = change.email {
            active.email = Set(email);
        }
        if let Some(phone_number) = change.phone_number {
            active.phone_number = Set(phone_number);
        }
        if let Some(photo_id) = change.photo_id {
            active.photo_id = Set(photo_id);
        }
        if let Some(password) = change.password {
            active.password = Set(Some(password));
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Grant or revoke the manager role.
    pub async fn set_manager(&self, user_id: &str, is_manager: bool) -> AppResult<profile::Model> {
        let found = self.get_by_user_id(user_id).await?;

        let mut active: profile::ActiveModel = found.into();
        active.is_manager = Set(is_manager);

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_profile(user_id: &str, is_manager: bool) -> profile::Model {
        profile::Model {
            user_id: user_id.to_string(),
            password: Some("hash".to_string()),
            first_name: Some("Ivan".to_string()),
            last_name: None,
            email: None,
            phone_number: None,
            is_manager,
            photo_id: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_user_id_returns_profile() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_profile("u1", false)]])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let found = repo.find_by_user_id("u1").await.unwrap();

        assert!(found.is_some());
        assert_eq!(found.unwrap().first_name.as_deref(), Some("Ivan"));
    }

    #[tokio::test]
    async fn test_update_keeps_unset_fields() {
        let before = test_profile("u1", false);
        let mut after = before.clone();
        after.email = Some("ivan@example.com".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[before]])
                .append_query_results([[after]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let change = ProfileChange {
            email: Some(Some("ivan@example.com".to_string())),
            ..Default::default()
        };
        let updated = repo.update("u1", change).await.unwrap();

        assert_eq!(updated.email.as_deref(), Some("ivan@example.com"));
        assert_eq!(updated.first_name.as_deref(), Some("Ivan"));
    }

    #[tokio::test]
    async fn test_set_manager_flips_flag() {
        let before = test_profile("u1", false);
        let after = test_profile("u1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[before]])
                .append_query_results([[after]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let updated = repo.set_manager("u1", true).await.unwrap();

        assert!(updated.is_manager);
    }
}
