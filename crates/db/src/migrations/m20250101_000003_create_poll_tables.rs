//! Create poll, `vote_option` and vote tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create poll detail table
        manager
            .create_table(
                Table::create()
                    .table(Poll::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Poll::InquiryId).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Poll::Deadline).date().not_null())
                    .col(
                        ColumnDef::new(Poll::PreliminaryResults)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_inquiry")
                            .from(Poll::Table, Poll::InquiryId)
                            .to(Inquiry::Table, Inquiry::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create vote_option table
        manager
            .create_table(
                Table::create()
                    .table(VoteOption::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VoteOption::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(VoteOption::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(VoteOption::Text).text().not_null())
                    .col(ColumnDef::new(VoteOption::DisplayOrder).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_option_poll")
                            .from(VoteOption::Table, VoteOption::PollId)
                            .to(Poll::Table, Poll::InquiryId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: poll_id
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_option_poll_id")
                    .table(VoteOption::Table)
                    .col(VoteOption::PollId)
                    .to_owned(),
            )
            .await?;

        // Create vote table
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vote::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Vote::OptionId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::VoterId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_option")
                            .from(Vote::Table, Vote::OptionId)
                            .to(VoteOption::Table, VoteOption::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_poll")
                            .from(Vote::Table, Vote::PollId)
                            .to(Poll::Table, Poll::InquiryId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_voter")
                            .from(Vote::Table, Vote::VoterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (poll_id, voter_id) — one vote per user per poll,
        // enforced by the store in addition to the service-level check.
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_poll_voter_unique")
                    .table(Vote::Table)
                    .col(Vote::PollId)
                    .col(Vote::VoterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: option_id (result tallies)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_option_id")
                    .table(Vote::Table)
                    .col(Vote::OptionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(VoteOption::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Poll::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Poll {
    Table,
    InquiryId,
    Deadline,
    PreliminaryResults,
}

#[derive(Iden)]
enum VoteOption {
    Table,
    Id,
    PollId,
    Text,
    DisplayOrder,
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    OptionId,
    PollId,
    VoterId,
    CreatedAt,
}

#[derive(Iden)]
enum Inquiry {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
