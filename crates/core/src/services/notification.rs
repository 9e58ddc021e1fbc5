//! Notification service: manager-issued, recipient-scoped records.

use domus_common::{AppError, AppResult, IdGenerator};
use domus_db::{
    entities::{
        inquiry,
        notification::{self, NotificationCategory},
    },
    repositories::{NotificationRepository, UserRepository},
};
use serde::Deserialize;
use validator::Validate;

use super::Caller;

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for issuing a notification.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 8192))]
    pub text: String,

    pub recipient_id: String,
    pub category: Option<NotificationCategory>,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository, user_repo: UserRepository) -> Self {
        Self {
            notification_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Issue a notification to a recipient. Manager only.
    pub async fn create(
        &self,
        caller: &Caller,
        input: CreateNotificationInput,
    ) -> AppResult<(inquiry::Model, notification::Model)> {
        if !caller.is_manager {
            return Err(AppError::Forbidden(
                "Only managers may issue notifications".to_string(),
            ));
        }

        input.validate()?;

        // The recipient must exist.
        self.user_repo.get_by_id(&input.recipient_id).await?;

        self.notification_repo
            .create(
                self.id_gen.generate(),
                input.title,
                input.text,
                Some(caller.id.clone()),
                input.recipient_id,
                input.category.unwrap_or(NotificationCategory::General),
            )
            .await
    }

    /// List the caller's notifications, optionally filtered by title.
    pub async fn list(
        &self,
        caller: &Caller,
        title: Option<&str>,
    ) -> AppResult<Vec<(inquiry::Model, notification::Model)>> {
        self.notification_repo
            .find_for_recipient(&caller.id, title)
            .await
    }

    /// Read one notification. Recipient only.
    pub async fn get(
        &self,
        caller: &Caller,
        id: &str,
    ) -> AppResult<(inquiry::Model, notification::Model)> {
        let (base, detail) = self.notification_repo.get_by_id(id).await?;

        if detail.recipient_id != caller.id {
            return Err(AppError::Forbidden(
                "Only the recipient may view this notification".to_string(),
            ));
        }

        Ok((base, detail))
    }

    /// Mark a notification read. Recipient only; the read flag is always
    /// forced true and the updated timestamp refreshed.
    pub async fn mark_read(
        &self,
        caller: &Caller,
        id: &str,
    ) -> AppResult<(inquiry::Model, notification::Model)> {
        let (_, detail) = self.notification_repo.get_by_id(id).await?;

        if detail.recipient_id != caller.id {
            return Err(AppError::Forbidden(
                "Only the recipient may update this notification".to_string(),
            ));
        }

        self.notification_repo.mark_read(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_base(id: &str) -> inquiry::Model {
        inquiry::Model {
            id: id.to_string(),
            title: "Bill due".to_string(),
            text: "Pay by Friday".to_string(),
            creator_id: Some("mgr".to_string()),
            created_at: Utc::now().fixed_offset(),
            updated_at: None,
        }
    }

    fn test_detail(id: &str, recipient: &str) -> notification::Model {
        notification::Model {
            inquiry_id: id.to_string(),
            recipient_id: recipient.to_string(),
            is_read: false,
            category: NotificationCategory::Billing,
        }
    }

    fn service_with(
        notification_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
    ) -> NotificationService {
        NotificationService::new(
            NotificationRepository::new(notification_db),
            UserRepository::new(user_db),
        )
    }

    #[tokio::test]
    async fn test_create_requires_manager() {
        let notification_db =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(notification_db, user_db);
        let err = service
            .create(
                &Caller::resident("u1"),
                CreateNotificationInput {
                    title: "Bill".to_string(),
                    text: "Pay up".to_string(),
                    recipient_id: "u2".to_string(),
                    category: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_get_denied_for_non_recipient() {
        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(test_detail("n1", "u1"), test_base("n1"))]])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(notification_db, user_db);
        let err = service
            .get(&Caller::resident("someone-else"), "n1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_get_allows_recipient() {
        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(test_detail("n1", "u1"), test_base("n1"))]])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(notification_db, user_db);
        let (base, detail) = service.get(&Caller::resident("u1"), "n1").await.unwrap();

        assert_eq!(base.title, "Bill due");
        assert_eq!(detail.recipient_id, "u1");
    }
}
