//! Create info table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Info::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Info::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Info::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Info::Text).text().not_null())
                    .col(
                        ColumnDef::new(Info::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Info::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Info::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Info {
    Table,
    Id,
    Title,
    Text,
    CreatedAt,
    UpdatedAt,
}
