//! Poll service: creation with options, result views and vote casting.

use chrono::Local;
use domus_common::{AppError, AppResult, IdGenerator};
use domus_db::{
    entities::{inquiry, poll, vote, vote_option},
    repositories::PollRepository,
};
use serde::Deserialize;
use validator::Validate;

use super::Caller;
use crate::dates::parse_date_field;

/// Poll service for business logic.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
    id_gen: IdGenerator,
}

/// Input for creating a poll.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 8192))]
    pub text: String,

    /// Date string; longer timestamps are read by their leading date.
    pub deadline: String,

    #[serde(default)]
    pub preliminary_results: bool,

    pub options: Vec<String>,
}

/// One option with its running tally. `votes` is `None` while results
/// are withheld.
pub struct OptionWithCount {
    pub option: vote_option::Model,
    pub votes: Option<u64>,
}

/// A poll as presented to a caller: base record, detail, options and the
/// caller's own ballot.
pub struct PollView {
    pub base: inquiry::Model,
    pub detail: poll::Model,
    pub options: Vec<OptionWithCount>,
    pub own_vote: Option<vote::Model>,
    pub is_closed: bool,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub const fn new(poll_repo: PollRepository) -> Self {
        Self {
            poll_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a poll together with its options, in one transaction. A
    /// poll is never observable without its options.
    pub async fn create(
        &self,
        caller: &Caller,
        input: CreatePollInput,
    ) -> AppResult<(inquiry::Model, poll::Model, Vec<vote_option::Model>)> {
        input.validate()?;

        if input.options.len() < 2 {
            return Err(AppError::BadRequest(
                "Poll must have at least 2 options".to_string(),
            ));
        }
        if input.options.len() > 20 {
            return Err(AppError::BadRequest(
                "Poll cannot have more than 20 options".to_string(),
            ));
        }
        for option in &input.options {
            if option.trim().is_empty() {
                return Err(AppError::BadRequest(
                    "Poll options cannot be empty".to_string(),
                ));
            }
            if option.len() > 200 {
                return Err(AppError::BadRequest(
                    "Poll option is too long (max 200 chars)".to_string(),
                ));
            }
        }

        let deadline = parse_date_field(&input.deadline)?;

        let options = input
            .options
            .into_iter()
            .map(|text| (self.id_gen.generate(), text))
            .collect();

        self.poll_repo
            .create_with_options(
                self.id_gen.generate(),
                input.title,
                input.text,
                Some(caller.id.clone()),
                deadline,
                input.preliminary_results,
                options,
            )
            .await
    }

    /// List all polls. Unrestricted for authenticated callers.
    pub async fn list(&self) -> AppResult<Vec<(inquiry::Model, poll::Model)>> {
        self.poll_repo.find_all().await
    }

    /// Read one poll with options, tallies and the caller's own ballot.
    /// Tallies are withheld until the deadline passes unless the poll
    /// publishes preliminary results.
    pub async fn get(&self, caller: &Caller, id: &str) -> AppResult<PollView> {
        let (base, detail) = self.poll_repo.get_by_id(id).await?;
        let options = self.poll_repo.find_options(id).await?;
        let own_vote = self.poll_repo.find_vote(id, &caller.id).await?;

        let today = Local::now().date_naive();
        let is_closed = detail.deadline < today;
        let show_results = detail.preliminary_results || is_closed;

        let mut with_counts = Vec::with_capacity(options.len());
        if show_results {
            let votes = self.poll_repo.find_votes(id).await?;
            for option in options {
                let count = votes.iter().filter(|v| v.option_id == option.id).count() as u64;
                with_counts.push(OptionWithCount {
                    option,
                    votes: Some(count),
                });
            }
        } else {
            for option in options {
                with_counts.push(OptionWithCount {
                    option,
                    votes: None,
                });
            }
        }

        Ok(PollView {
            base,
            detail,
            options: with_counts,
            own_vote,
            is_closed,
        })
    }

    /// Cast a ballot. One ballot per caller per poll, regardless of
    /// option; the duplicate check runs atomically with the insert.
    pub async fn vote(
        &self,
        caller: &Caller,
        poll_id: &str,
        option_id: &str,
    ) -> AppResult<vote::Model> {
        let (_, detail) = self.poll_repo.get_by_id(poll_id).await?;

        let today = Local::now().date_naive();
        if detail.deadline < today {
            return Err(AppError::BadRequest("Poll is closed".to_string()));
        }

        self.poll_repo
            .cast_vote(self.id_gen.generate(), poll_id, option_id, &caller.id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_base(id: &str) -> inquiry::Model {
        inquiry::Model {
            id: id.to_string(),
            title: "New playground".to_string(),
            text: "Pick a design".to_string(),
            creator_id: Some("mgr".to_string()),
            created_at: Utc::now().fixed_offset(),
            updated_at: None,
        }
    }

    fn test_detail(id: &str, deadline: NaiveDate, preliminary: bool) -> poll::Model {
        poll::Model {
            inquiry_id: id.to_string(),
            deadline,
            preliminary_results: preliminary,
        }
    }

    fn test_option(id: &str, poll_id: &str, order: i32) -> vote_option::Model {
        vote_option::Model {
            id: id.to_string(),
            poll_id: poll_id.to_string(),
            text: format!("Option {order}"),
            display_order: order,
        }
    }

    fn test_vote(id: &str, poll_id: &str, option_id: &str, voter: &str) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            option_id: option_id.to_string(),
            poll_id: poll_id.to_string(),
            voter_id: voter.to_string(),
            created_at: Utc::now().fixed_offset(),
        }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> PollService {
        PollService::new(PollRepository::new(db))
    }

    fn valid_input(options: Vec<&str>) -> CreatePollInput {
        CreatePollInput {
            title: "New playground".to_string(),
            text: "Pick a design".to_string(),
            deadline: "2030-01-01".to_string(),
            preliminary_results: false,
            options: options.into_iter().map(ToString::to_string).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_single_option() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let err = service
            .create(&Caller::resident("u1"), valid_input(vec!["only one"]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_option() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let err = service
            .create(&Caller::resident("u1"), valid_input(vec!["a", "   "]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_deadline() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let mut input = valid_input(vec!["a", "b"]);
        input.deadline = "soon".to_string();
        let err = service
            .create(&Caller::resident("u1"), input)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_vote_rejected_after_deadline() {
        let yesterday = Local::now().date_naive() - Duration::days(1);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(test_detail("p1", yesterday, false), test_base("p1"))]])
                .into_connection(),
        );

        let service = service_with(db);
        let err = service
            .vote(&Caller::resident("u1"), "p1", "opt1")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_second_vote_rejected_with_conflict() {
        let tomorrow = Local::now().date_naive() + Duration::days(1);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // poll lookup
                .append_query_results([[(test_detail("p1", tomorrow, false), test_base("p1"))]])
                // existing ballot found inside cast_vote
                .append_query_results([[test_vote("v1", "p1", "optA", "u1")]])
                .into_connection(),
        );

        let service = service_with(db);
        let err = service
            .vote(&Caller::resident("u1"), "p1", "optB")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_first_vote_succeeds() {
        let tomorrow = Local::now().date_naive() + Duration::days(1);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(test_detail("p1", tomorrow, false), test_base("p1"))]])
                .append_query_results([Vec::<vote::Model>::new()])
                .append_query_results([vec![test_option("optA", "p1", 0)]])
                .append_query_results([vec![test_vote("v1", "p1", "optA", "u1")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service_with(db);
        let ballot = service
            .vote(&Caller::resident("u1"), "p1", "optA")
            .await
            .unwrap();

        assert_eq!(ballot.voter_id, "u1");
    }

    #[tokio::test]
    async fn test_get_withholds_results_before_deadline() {
        let tomorrow = Local::now().date_naive() + Duration::days(1);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(test_detail("p1", tomorrow, false), test_base("p1"))]])
                .append_query_results([vec![
                    test_option("optA", "p1", 0),
                    test_option("optB", "p1", 1),
                ]])
                .append_query_results([Vec::<vote::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db);
        let view = service.get(&Caller::resident("u1"), "p1").await.unwrap();

        assert!(!view.is_closed);
        assert!(view.options.iter().all(|o| o.votes.is_none()));
    }

    #[tokio::test]
    async fn test_get_tallies_when_preliminary() {
        let tomorrow = Local::now().date_naive() + Duration::days(1);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(test_detail("p1", tomorrow, true), test_base("p1"))]])
                .append_query_results([vec![
                    test_option("optA", "p1", 0),
                    test_option("optB", "p1", 1),
                ]])
                .append_query_results([vec![test_vote("v1", "p1", "optA", "u1")]])
                .append_query_results([vec![
                    test_vote("v2", "p1", "optA", "u2"),
                    test_vote("v1", "p1", "optA", "u1"),
                ]])
                .into_connection(),
        );

        let service = service_with(db);
        let view = service.get(&Caller::resident("u1"), "p1").await.unwrap();

        assert_eq!(view.options[0].votes, Some(2));
        assert_eq!(view.options[1].votes, Some(0));
        assert!(view.own_vote.is_some());
    }
}
