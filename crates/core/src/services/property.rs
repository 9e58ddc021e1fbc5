//! Property service: the building registry and its ownership links.

use domus_common::{AppError, AppResult, IdGenerator};
use domus_db::{
    entities::{
        ownership,
        property::{self, PropertyKind},
    },
    repositories::{property::PropertyChange, PropertyRepository, UserRepository},
};
use serde::Deserialize;
use validator::Validate;

use super::Caller;

/// Property service for business logic.
#[derive(Clone)]
pub struct PropertyService {
    property_repo: PropertyRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for registering a property.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyInput {
    #[validate(length(min = 1, max = 100))]
    pub street: String,

    #[validate(range(min = 1))]
    pub building_number: i32,

    #[validate(range(min = 0))]
    pub entrance_number: i32,

    pub floor_number: i32,

    #[validate(range(min = 1))]
    pub unit_number: i32,

    #[validate(range(min = 1))]
    pub area: i32,

    pub kind: Option<PropertyKind>,
}

/// Input for updating a property.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyInput {
    #[validate(length(min = 1, max = 100))]
    pub street: Option<String>,

    pub building_number: Option<i32>,
    pub entrance_number: Option<i32>,
    pub floor_number: Option<i32>,
    pub unit_number: Option<i32>,

    #[validate(range(min = 1))]
    pub area: Option<i32>,

    pub kind: Option<PropertyKind>,
}

impl PropertyService {
    /// Create a new property service.
    #[must_use]
    pub const fn new(property_repo: PropertyRepository, user_repo: UserRepository) -> Self {
        Self {
            property_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a property. Manager only.
    pub async fn create(
        &self,
        caller: &Caller,
        input: CreatePropertyInput,
    ) -> AppResult<property::Model> {
        ensure_manager(caller)?;
        input.validate()?;

        self.property_repo
            .create(
                self.id_gen.generate(),
                input.street,
                input.building_number,
                input.entrance_number,
                input.floor_number,
                input.unit_number,
                input.area,
                input.kind.unwrap_or(PropertyKind::Residential),
            )
            .await
    }

    /// List all properties.
    pub async fn list(&self) -> AppResult<Vec<property::Model>> {
        self.property_repo.find_all().await
    }

    /// List the properties the caller owns.
    pub async fn list_mine(&self, caller: &Caller) -> AppResult<Vec<property::Model>> {
        self.property_repo.find_owned_by(&caller.id).await
    }

    /// Read one property.
    pub async fn get(&self, id: &str) -> AppResult<property::Model> {
        self.property_repo.get_by_id(id).await
    }

    /// Update a property. Manager only.
    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        input: UpdatePropertyInput,
    ) -> AppResult<property::Model> {
        ensure_manager(caller)?;
        input.validate()?;

        self.property_repo
            .update(
                id,
                PropertyChange {
                    street: input.street,
                    building_number: input.building_number,
                    entrance_number: input.entrance_number,
                    floor_number: input.floor_number,
                    unit_number: input.unit_number,
                    area: input.area,
                    kind: input.kind,
                },
            )
            .await
    }

    /// Remove a property. Manager only; ownership links cascade.
    pub async fn delete(&self, caller: &Caller, id: &str) -> AppResult<()> {
        ensure_manager(caller)?;

        // Missing targets are reported before the delete runs.
        self.property_repo.get_by_id(id).await?;
        self.property_repo.delete(id).await
    }

    /// Link an owner to a property. Manager only.
    pub async fn add_owner(
        &self,
        caller: &Caller,
        property_id: &str,
        owner_id: &str,
    ) -> AppResult<ownership::Model> {
        ensure_manager(caller)?;

        self.property_repo.get_by_id(property_id).await?;
        self.user_repo.get_by_id(owner_id).await?;

        self.property_repo
            .add_owner(self.id_gen.generate(), property_id, owner_id)
            .await
    }

    /// Unlink an owner from a property. Manager only.
    pub async fn remove_owner(
        &self,
        caller: &Caller,
        property_id: &str,
        owner_id: &str,
    ) -> AppResult<()> {
        ensure_manager(caller)?;

        self.property_repo.get_by_id(property_id).await?;
        self.property_repo.remove_owner(property_id, owner_id).await
    }

    /// List ownership links for a property. Manager only.
    pub async fn owners(
        &self,
        caller: &Caller,
        property_id: &str,
    ) -> AppResult<Vec<ownership::Model>> {
        ensure_manager(caller)?;

        self.property_repo.get_by_id(property_id).await?;
        self.property_repo.find_owners(property_id).await
    }
}

fn ensure_manager(caller: &Caller) -> AppResult<()> {
    if caller.is_manager {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only managers may modify the property registry".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_property(id: &str) -> property::Model {
        property::Model {
            id: id.to_string(),
            street: "Oak St".to_string(),
            building_number: 12,
            entrance_number: 1,
            floor_number: 3,
            unit_number: 7,
            area: 64,
            kind: PropertyKind::Residential,
        }
    }

    fn service_with(
        property_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
    ) -> PropertyService {
        PropertyService::new(
            PropertyRepository::new(property_db),
            UserRepository::new(user_db),
        )
    }

    #[tokio::test]
    async fn test_create_requires_manager() {
        let property_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(property_db, user_db);
        let err = service
            .create(
                &Caller::resident("u1"),
                CreatePropertyInput {
                    street: "Oak St".to_string(),
                    building_number: 12,
                    entrance_number: 1,
                    floor_number: 3,
                    unit_number: 7,
                    area: 64,
                    kind: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_list_mine_returns_owned() {
        let property_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![ownership::Model {
                    id: "o1".to_string(),
                    owner_id: "u1".to_string(),
                    property_id: "p1".to_string(),
                }]])
                .append_query_results([vec![test_property("p1")]])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(property_db, user_db);
        let mine = service.list_mine(&Caller::resident("u1")).await.unwrap();

        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "p1");
    }

    #[tokio::test]
    async fn test_delete_missing_property_is_not_found() {
        let property_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<property::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(property_db, user_db);
        let err = service
            .delete(&Caller::manager("mgr"), "missing")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
