//! Poll repository.
//!
//! A poll is an inquiry row, a poll detail row and its vote options, all
//! written in one transaction so no poll is ever observable without its
//! options. Vote casting re-checks for an existing ballot inside a
//! transaction; the unique (`poll_id`, `voter_id`) index backs that check
//! up at the store level.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use domus_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{inquiry, poll, vote, vote_option, Inquiry, Poll, Vote, VoteOption};

/// Repository for poll and vote operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a poll with its options, atomically. `options` pairs a
    /// pre-generated option ID with the option text, in display order.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_with_options(
        &self,
        id: String,
        title: String,
        text: String,
        creator_id: Option<String>,
        deadline: NaiveDate,
        preliminary_results: bool,
        options: Vec<(String, String)>,
    ) -> AppResult<(inquiry::Model, poll::Model, Vec<vote_option::Model>)> {
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

        let detail = poll::ActiveModel {
            inquiry_id: Set(id.clone()),
            deadline: Set(deadline),
            preliminary_results: Set(preliminary_results),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let mut created_options = Vec::with_capacity(options.len());
        for (order, (option_id, option_text)) in options.into_iter().enumerate() {
            let option = vote_option::ActiveModel {
                id: Set(option_id),
                poll_id: Set(id.clone()),
                text: Set(option_text),
                display_order: Set(i32::try_from(order).unwrap_or(i32::MAX)),
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
            created_options.push(option);
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((base, detail, created_options))
    }

    /// Find a poll by inquiry ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<(inquiry::Model, poll::Model)>> {
        let found = Poll::find_by_id(id)
            .find_also_related(Inquiry)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(found.and_then(|(detail, base)| base.map(|b| (b, detail))))
    }

    /// Get a poll by inquiry ID, returning an error when absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<(inquiry::Model, poll::Model)> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Poll not found: {id}")))
    }

    /// List all polls, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<(inquiry::Model, poll::Model)>> {
        let rows = Poll::find()
            .find_also_related(Inquiry)
            .order_by(inquiry::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(detail, base)| base.map(|b| (b, detail)))
            .collect())
    }

    /// List a poll's options in display order.
    pub async fn find_options(&self, poll_id: &str) -> AppResult<Vec<vote_option::Model>> {
        VoteOption::find()
            .filter(vote_option::Column::PollId.eq(poll_id))
            .order_by(vote_option::Column::DisplayOrder, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a ballot. The duplicate check and the option-membership check
    /// run against state read inside the transaction.
    pub async fn cast_vote(
        &self,
        vote_id: String,
        poll_id: &str,
        option_id: &str,
        voter_id: &str,
    ) -> AppResult<vote::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let existing = Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .filter(vote::Column::VoterId.eq(voter_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "User {voter_id} has already voted on poll {poll_id}"
            )));
        }

        let option = VoteOption::find_by_id(option_id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Vote option not found: {option_id}")))?;

        if option.poll_id != poll_id {
            return Err(AppError::BadRequest(format!(
                "Option {option_id} does not belong to poll {poll_id}"
            )));
        }

        let ballot = vote::ActiveModel {
            id: Set(vote_id),
            option_id: Set(option_id.to_string()),
            poll_id: Set(poll_id.to_string()),
            voter_id: Set(voter_id.to_string()),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ballot)
    }

    /// Find the ballot a user cast on a poll, if any.
    pub async fn find_vote(
        &self,
        poll_id: &str,
        voter_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .filter(vote::Column::VoterId.eq(voter_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count ballots cast for one option.
    pub async fn count_votes_for_option(&self, option_id: &str) -> AppResult<u64> {
        Vote::find()
            .filter(vote::Column::OptionId.eq(option_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All ballots for a poll, for result tallies.
    pub async fn find_votes(&self, poll_id: &str) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

}
