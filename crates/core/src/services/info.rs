//! Info service: manager-authored informational records.

use domus_common::{AppError, AppResult, IdGenerator};
use domus_db::{entities::info, repositories::InfoRepository};
use serde::Deserialize;
use validator::Validate;

use super::Caller;

/// Info service for business logic.
#[derive(Clone)]
pub struct InfoService {
    info_repo: InfoRepository,
    id_gen: IdGenerator,
}

/// Input for creating an info record.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInfoInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 16384))]
    pub text: String,
}

/// Input for updating an info record.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfoInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 16384))]
    pub text: Option<String>,
}

impl InfoService {
    /// Create a new info service.
    #[must_use]
    pub const fn new(info_repo: InfoRepository) -> Self {
        Self {
            info_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an info record. Manager only.
    pub async fn create(&self, caller: &Caller, input: CreateInfoInput) -> AppResult<info::Model> {
        ensure_manager(caller)?;
        input.validate()?;

        self.info_repo
            .create(self.id_gen.generate(), input.title, input.text)
            .await
    }

    /// List all info records.
    pub async fn list(&self) -> AppResult<Vec<info::Model>> {
        self.info_repo.find_all().await
    }

    /// Read one info record.
    pub async fn get(&self, id: &str) -> AppResult<info::Model> {
        self.info_repo.get_by_id(id).await
    }

    /// Update an info record. Manager only.
    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        input: UpdateInfoInput,
    ) -> AppResult<info::Model> {
        ensure_manager(caller)?;
        input.validate()?;

        self.info_repo.update(id, input.title, input.text).await
    }

    /// Delete an info record. Manager only.
    pub async fn delete(&self, caller: &Caller, id: &str) -> AppResult<()> {
        ensure_manager(caller)?;

        self.info_repo.get_by_id(id).await?;
        self.info_repo.delete(id).await
    }
}

fn ensure_manager(caller: &Caller) -> AppResult<()> {
    if caller.is_manager {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only managers may manage info records".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_info(id: &str) -> info::Model {
        info::Model {
            id: id.to_string(),
            title: "House rules".to_string(),
            text: "No loud music after 22:00".to_string(),
            created_at: Utc::now().fixed_offset(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_manager() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = InfoService::new(InfoRepository::new(db));

        let err = service
            .create(
                &Caller::resident("u1"),
                CreateInfoInput {
                    title: "Rules".to_string(),
                    text: "text".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_list_open_to_all() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_info("i1")]])
                .into_connection(),
        );
        let service = InfoService::new(InfoRepository::new(db));

        let records = service.list().await.unwrap();
        assert_eq!(records.len(), 1);
    }
}
