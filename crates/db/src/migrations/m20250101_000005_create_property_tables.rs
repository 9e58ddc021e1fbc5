//! Create property and ownership tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Property::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Property::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Property::Street).string_len(100).not_null())
                    .col(ColumnDef::new(Property::BuildingNumber).integer().not_null())
                    .col(ColumnDef::new(Property::EntranceNumber).integer().not_null())
                    .col(ColumnDef::new(Property::FloorNumber).integer().not_null())
                    .col(ColumnDef::new(Property::UnitNumber).integer().not_null())
                    .col(ColumnDef::new(Property::Area).integer().not_null())
                    .col(
                        ColumnDef::new(Property::Kind)
                            .string_len(16)
                            .not_null()
                            .default("residential"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ownership::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ownership::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Ownership::OwnerId).string_len(32).not_null())
                    .col(ColumnDef::new(Ownership::PropertyId).string_len(32).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ownership_owner")
                            .from(Ownership::Table, Ownership::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ownership_property")
                            .from(Ownership::Table, Ownership::PropertyId)
                            .to(Property::Table, Property::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (owner_id, property_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_ownership_unique")
                    .table(Ownership::Table)
                    .col(Ownership::OwnerId)
                    .col(Ownership::PropertyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ownership::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Property::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Property {
    Table,
    Id,
    Street,
    BuildingNumber,
    EntranceNumber,
    FloorNumber,
    UnitNumber,
    Area,
    Kind,
}

#[derive(Iden)]
enum Ownership {
    Table,
    Id,
    OwnerId,
    PropertyId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
