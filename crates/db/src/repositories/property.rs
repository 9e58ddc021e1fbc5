//! Property and ownership repository.

use std::sync::Arc;

use domus_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::{
    ownership,
    property::{self, PropertyKind},
    Ownership, Property,
};

/// Partial update for a property. `None` leaves the field untouched.
#[derive(Debug, Default)]
pub struct PropertyChange {
    pub street: Option<String>,
    pub building_number: Option<i32>,
    pub entrance_number: Option<i32>,
    pub floor_number: Option<i32>,
    pub unit_number: Option<i32>,
    pub area: Option<i32>,
    pub kind: Option<PropertyKind>,
}

/// Repository for property and ownership operations.
#[derive(Clone)]
pub struct PropertyRepository {
    db: Arc<DatabaseConnection>,
}

impl PropertyRepository {
    /// Create a new property repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Register a property.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        id: String,
        street: String,
        building_number: i32,
        entrance_number: i32,
        floor_number: i32,
        unit_number: i32,
        area: i32,
        kind: PropertyKind,
    ) -> AppResult<property::Model> {
        property::ActiveModel {
            id: Set(id),
            street: Set(street),
            building_number: Set(building_number),
            entrance_number: Set(entrance_number),
            floor_number: Set(floor_number),
            unit_number: Set(unit_number),
            area: Set(area),
            kind: Set(kind),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a property by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<property::Model>> {
        Property::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a property by ID, returning an error when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<property::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Property not found: {id}")))
    }

    /// List all properties ordered by address.
    pub async fn find_all(&self) -> AppResult<Vec<property::Model>> {
        Property::find()
            .order_by(property::Column::Street, Order::Asc)
            .order_by(property::Column::BuildingNumber, Order::Asc)
            .order_by(property::Column::UnitNumber, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply a partial update to a property.
    pub async fn update(&self, id: &str, change: PropertyChange) -> AppResult<property::Model> {
        let found = self.get_by_id(id).await?;

        let mut active: property::ActiveModel = found.into();

        if let Some(street) = change.street {
            active.street = Set(street);
        }
        if let Some(building_number) = change.building_number {
            active.building_number = Set(building_number);
        }
        if let Some(entrance_number) = change.entrance_number {
            active.entrance_number = Set(entrance_number);
        }
        if let Some(floor_number) = change.floor_number {
            active.floor_number = Set(floor_number);
        }
        if let Some(unit_number) = change.unit_number {
            active.unit_number = Set(unit_number);
        }
        if let Some(area) = change.area {
            active.area = Set(area);
        }
        if let Some(kind) = change.kind {
            active.kind = Set(kind);
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a property. Ownership links cascade at the store level.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Property::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Link an owner to a property. Duplicate links report a conflict.
    pub async fn add_owner(
        &self,
        link_id: String,
        property_id: &str,
        owner_id: &str,
    ) -> AppResult<ownership::Model> {
        let existing = Ownership::find()
            .filter(ownership::Column::PropertyId.eq(property_id))
            .filter(ownership::Column::OwnerId.eq(owner_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "User {owner_id} already owns property {property_id}"
            )));
        }

        ownership::ActiveModel {
            id: Set(link_id),
            owner_id: Set(owner_id.to_string()),
            property_id: Set(property_id.to_string()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove an ownership link.
    pub async fn remove_owner(&self, property_id: &str, owner_id: &str) -> AppResult<()> {
        Ownership::delete_many()
            .filter(ownership::Column::PropertyId.eq(property_id))
            .filter(ownership::Column::OwnerId.eq(owner_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List ownership links for a property.
    pub async fn find_owners(&self, property_id: &str) -> AppResult<Vec<ownership::Model>> {
        Ownership::find()
            .filter(ownership::Column::PropertyId.eq(property_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the properties a user owns.
    pub async fn find_owned_by(&self, owner_id: &str) -> AppResult<Vec<property::Model>> {
        let links = Ownership::find()
            .filter(ownership::Column::OwnerId.eq(owner_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let ids: Vec<String> = links.into_iter().map(|l| l.property_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Property::find()
            .filter(property::Column::Id.is_in(ids))
            .order_by(property::Column::Street, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
