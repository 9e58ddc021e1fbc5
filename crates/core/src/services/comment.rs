//! Comment service.
//!
//! Comments attach to announcements (open to every authenticated user)
//! and to todos (creator or manager only). Other inquiry kinds do not
//! take comments.

use domus_common::{AppError, AppResult, IdGenerator};
use domus_db::{
    entities::comment,
    repositories::{AnnouncementRepository, CommentRepository, TodoRepository},
};
use serde::Deserialize;
use validator::Validate;

use super::Caller;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    announcement_repo: AnnouncementRepository,
    todo_repo: TodoRepository,
    id_gen: IdGenerator,
}

/// Input for posting a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 4096))]
    pub text: String,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        announcement_repo: AnnouncementRepository,
        todo_repo: TodoRepository,
    ) -> Self {
        Self {
            comment_repo,
            announcement_repo,
            todo_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a comment under an inquiry, subject to the per-kind policy.
    pub async fn create(
        &self,
        caller: &Caller,
        inquiry_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        self.authorize_comment(caller, inquiry_id).await?;

        self.comment_repo
            .create(
                self.id_gen.generate(),
                inquiry_id.to_string(),
                input.text,
                Some(caller.id.clone()),
            )
            .await
    }

    /// List the comment thread under an inquiry. The parent must exist;
    /// reading is not otherwise restricted.
    pub async fn list(&self, inquiry_id: &str) -> AppResult<Vec<comment::Model>> {
        if !self.comment_repo.inquiry_exists(inquiry_id).await? {
            return Err(AppError::NotFound(format!(
                "Inquiry not found: {inquiry_id}"
            )));
        }

        self.comment_repo.find_by_inquiry(inquiry_id).await
    }

    /// Kind-specific comment policy. Announcements are open; todos admit
    /// the creator and managers; everything else is refused.
    async fn authorize_comment(&self, caller: &Caller, inquiry_id: &str) -> AppResult<()> {
        if self
            .announcement_repo
            .find_by_id(inquiry_id)
            .await?
            .is_some()
        {
            return Ok(());
        }

        if let Some((base, _)) = self.todo_repo.find_by_id(inquiry_id).await? {
            if caller.is_manager || base.creator_id.as_deref() == Some(caller.id.as_str()) {
                return Ok(());
            }
            return Err(AppError::Forbidden(
                "Only the creator or a manager may comment on this todo".to_string(),
            ));
        }

        if self.comment_repo.inquiry_exists(inquiry_id).await? {
            return Err(AppError::Forbidden(
                "This record does not take comments".to_string(),
            ));
        }

        Err(AppError::NotFound(format!(
            "Inquiry not found: {inquiry_id}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domus_db::entities::{
        announcement::{self, AnnouncementCategory},
        inquiry,
        todo::{self, TodoCategory, TodoPriority, TodoStatus},
    };
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_base(id: &str, creator: &str) -> inquiry::Model {
        inquiry::Model {
            id: id.to_string(),
            title: "title".to_string(),
            text: "text".to_string(),
            creator_id: Some(creator.to_string()),
            created_at: Utc::now().fixed_offset(),
            updated_at: None,
        }
    }

    fn test_announcement(id: &str) -> announcement::Model {
        announcement::Model {
            inquiry_id: id.to_string(),
            is_visible: true,
            auto_invisible_date: None,
            category: AnnouncementCategory::Other,
        }
    }

    fn test_todo(id: &str) -> todo::Model {
        todo::Model {
            inquiry_id: id.to_string(),
            priority: TodoPriority::Medium,
            status: TodoStatus::New,
            category: TodoCategory::Plumbing,
            assignee_id: None,
        }
    }

    fn test_comment(id: &str, inquiry_id: &str, creator: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            inquiry_id: inquiry_id.to_string(),
            text: "On it".to_string(),
            creator_id: Some(creator.to_string()),
            created_at: Utc::now().fixed_offset(),
        }
    }

    fn service_with(
        comment_db: Arc<sea_orm::DatabaseConnection>,
        announcement_db: Arc<sea_orm::DatabaseConnection>,
        todo_db: Arc<sea_orm::DatabaseConnection>,
    ) -> CommentService {
        CommentService::new(
            CommentRepository::new(comment_db),
            AnnouncementRepository::new(announcement_db),
            TodoRepository::new(todo_db),
        )
    }

    fn input(text: &str) -> CreateCommentInput {
        CreateCommentInput {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_any_user_comments_on_announcement() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // parent existence check inside create
                .append_query_results([vec![test_base("a1", "creator")]])
                .append_query_results([vec![test_comment("c1", "a1", "stranger")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let announcement_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(test_announcement("a1"), test_base("a1", "creator"))]])
                .into_connection(),
        );
        let todo_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(comment_db, announcement_db, todo_db);
        let comment = service
            .create(&Caller::resident("stranger"), "a1", input("Nice"))
            .await
            .unwrap();

        assert_eq!(comment.inquiry_id, "a1");
    }

    #[tokio::test]
    async fn test_todo_comment_denied_for_stranger() {
        let comment_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let announcement_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<(announcement::Model, inquiry::Model)>::new()])
                .into_connection(),
        );
        let todo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(test_todo("t1"), test_base("t1", "creator"))]])
                .into_connection(),
        );

        let service = service_with(comment_db, announcement_db, todo_db);
        let err = service
            .create(&Caller::resident("stranger"), "t1", input("Hm"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_todo_comment_allowed_for_creator_and_manager() {
        for caller in [Caller::resident("creator"), Caller::manager("mgr")] {
            let comment_db = Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([vec![test_base("t1", "creator")]])
                    .append_query_results([vec![test_comment("c1", "t1", &caller.id)]])
                    .append_exec_results([MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    }])
                    .into_connection(),
            );
            let announcement_db = Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([Vec::<(announcement::Model, inquiry::Model)>::new()])
                    .into_connection(),
            );
            let todo_db = Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[(test_todo("t1"), test_base("t1", "creator"))]])
                    .into_connection(),
            );

            let service = service_with(comment_db, announcement_db, todo_db);
            let comment = service.create(&caller, "t1", input("On it")).await.unwrap();

            assert_eq!(comment.inquiry_id, "t1");
        }
    }

    #[tokio::test]
    async fn test_comment_on_poll_refused() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // inquiry_exists: a poll inquiry row is present
                .append_query_results([vec![test_base("p1", "mgr")]])
                .into_connection(),
        );
        let announcement_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<(announcement::Model, inquiry::Model)>::new()])
                .into_connection(),
        );
        let todo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<(todo::Model, inquiry::Model)>::new()])
                .into_connection(),
        );

        let service = service_with(comment_db, announcement_db, todo_db);
        let err = service
            .create(&Caller::resident("u1"), "p1", input("Hm"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_comment_on_missing_inquiry_is_not_found() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<inquiry::Model>::new()])
                .into_connection(),
        );
        let announcement_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<(announcement::Model, inquiry::Model)>::new()])
                .into_connection(),
        );
        let todo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<(todo::Model, inquiry::Model)>::new()])
                .into_connection(),
        );

        let service = service_with(comment_db, announcement_db, todo_db);
        let err = service
            .create(&Caller::resident("u1"), "missing", input("Hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
