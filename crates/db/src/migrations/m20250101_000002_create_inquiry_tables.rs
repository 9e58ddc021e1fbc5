//! Create inquiry, todo, announcement and comment tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create inquiry base table
        manager
            .create_table(
                Table::create()
                    .table(Inquiry::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Inquiry::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Inquiry::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Inquiry::Text).text().not_null())
                    .col(ColumnDef::new(Inquiry::CreatorId).string_len(32))
                    .col(
                        ColumnDef::new(Inquiry::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Inquiry::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inquiry_creator")
                            .from(Inquiry::Table, Inquiry::CreatorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: creator_id (creator-scoped listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_inquiry_creator_id")
                    .table(Inquiry::Table)
                    .col(Inquiry::CreatorId)
                    .to_owned(),
            )
            .await?;

        // Create todo detail table
        manager
            .create_table(
                Table::create()
                    .table(Todo::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Todo::InquiryId).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Todo::Priority).string_len(16).not_null().default("medium"))
                    .col(ColumnDef::new(Todo::Status).string_len(16).not_null().default("new"))
                    .col(ColumnDef::new(Todo::Category).string_len(16).not_null().default("plumbing"))
                    .col(ColumnDef::new(Todo::AssigneeId).string_len(32))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_todo_inquiry")
                            .from(Todo::Table, Todo::InquiryId)
                            .to(Inquiry::Table, Inquiry::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_todo_assignee")
                            .from(Todo::Table, Todo::AssigneeId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create announcement detail table
        manager
            .create_table(
                Table::create()
                    .table(Announcement::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Announcement::InquiryId)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Announcement::IsVisible).boolean().not_null().default(true))
                    .col(ColumnDef::new(Announcement::AutoInvisibleDate).date())
                    .col(ColumnDef::new(Announcement::Category).string_len(16).not_null().default("sale"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_announcement_inquiry")
                            .from(Announcement::Table, Announcement::InquiryId)
                            .to(Inquiry::Table, Inquiry::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create comment table
        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comment::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Comment::InquiryId).string_len(32).not_null())
                    .col(ColumnDef::new(Comment::Text).text().not_null())
                    .col(ColumnDef::new(Comment::CreatorId).string_len(32))
                    .col(
                        ColumnDef::new(Comment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_inquiry")
                            .from(Comment::Table, Comment::InquiryId)
                            .to(Inquiry::Table, Inquiry::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_creator")
                            .from(Comment::Table, Comment::CreatorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: inquiry_id (comment listings per inquiry)
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_inquiry_id")
                    .table(Comment::Table)
                    .col(Comment::InquiryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Announcement::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Todo::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Inquiry::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Inquiry {
    Table,
    Id,
    Title,
    Text,
    CreatorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Todo {
    Table,
    InquiryId,
    Priority,
    Status,
    Category,
    AssigneeId,
}

#[derive(Iden)]
enum Announcement {
    Table,
    InquiryId,
    IsVisible,
    AutoInvisibleDate,
    Category,
}

#[derive(Iden)]
enum Comment {
    Table,
    Id,
    InquiryId,
    Text,
    CreatorId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
