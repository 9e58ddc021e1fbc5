//! Todo service: creation, listing policy and the status state machine.
//!
//! Lifecycle: `new -> in-progress -> in-review -> completed`, with a
//! reject step from in-review back to in-progress. Assignment is a
//! manager action; the review decision belongs to the creator.

use domus_common::{AppError, AppResult, IdGenerator};
use domus_db::{
    entities::{
        inquiry,
        todo::{self, TodoCategory, TodoPriority, TodoStatus},
    },
    repositories::{
        todo::{TodoChange, TodoFilter},
        TodoRepository,
    },
};
use serde::Deserialize;
use validator::Validate;

use super::Caller;

/// Todo service for business logic.
#[derive(Clone)]
pub struct TodoService {
    todo_repo: TodoRepository,
    id_gen: IdGenerator,
}

/// Input for creating a todo.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 8192))]
    pub text: String,

    pub priority: Option<TodoPriority>,
    pub category: Option<TodoCategory>,
}

/// Input for editing a todo's descriptive fields. Status changes go
/// through the transition operations instead.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 8192))]
    pub text: Option<String>,

    pub priority: Option<TodoPriority>,
    pub category: Option<TodoCategory>,
}

/// The creator's verdict on a todo sitting in review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Accept,
    Reject,
}

impl TodoService {
    /// Create a new todo service.
    #[must_use]
    pub const fn new(todo_repo: TodoRepository) -> Self {
        Self {
            todo_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a todo. Status starts at `new`, priority defaults to
    /// `medium`, category to `plumbing`.
    pub async fn create(
        &self,
        caller: &Caller,
        input: CreateTodoInput,
    ) -> AppResult<(inquiry::Model, todo::Model)> {
        input.validate()?;

        self.todo_repo
            .create(
                self.id_gen.generate(),
                input.title,
                input.text,
                Some(caller.id.clone()),
                input.priority.unwrap_or(TodoPriority::Medium),
                input.category.unwrap_or(TodoCategory::Plumbing),
                None,
            )
            .await
    }

    /// List todos. Managers see everything; residents see only what they
    /// created. `title` filters case-insensitively on any substring.
    pub async fn list(
        &self,
        caller: &Caller,
        title: Option<String>,
        status: Option<TodoStatus>,
        category: Option<TodoCategory>,
    ) -> AppResult<Vec<(inquiry::Model, todo::Model)>> {
        let filter = TodoFilter {
            title,
            status,
            category,
            assignee_id: None,
            creator_id: (!caller.is_manager).then(|| caller.id.clone()),
        };

        self.todo_repo.find_all(&filter).await
    }

    /// Get one todo. Only the creator or a manager may read it.
    pub async fn get(&self, caller: &Caller, id: &str) -> AppResult<(inquiry::Model, todo::Model)> {
        let (base, detail) = self.todo_repo.get_by_id(id).await?;

        if !caller.is_manager && base.creator_id.as_deref() != Some(caller.id.as_str()) {
            return Err(AppError::Forbidden(
                "Only the creator or a manager may view this todo".to_string(),
            ));
        }

        Ok((base, detail))
    }

    /// Edit descriptive fields. Only the creator or a manager.
    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        input: UpdateTodoInput,
    ) -> AppResult<(inquiry::Model, todo::Model)> {
        input.validate()?;

        // Also performs the read-access check.
        self.get(caller, id).await?;

        self.todo_repo
            .update(
                id,
                TodoChange {
                    title: input.title,
                    text: input.text,
                    priority: input.priority,
                    category: input.category,
                    assignee_id: None,
                },
            )
            .await
    }

    /// Assign the todo and move it to `in-progress`. Manager only; the
    /// guard re-checks assignment state against the row inside the
    /// update transaction.
    pub async fn assign(
        &self,
        caller: &Caller,
        id: &str,
        assignee_id: String,
    ) -> AppResult<todo::Model> {
        if !caller.is_manager {
            return Err(AppError::Forbidden(
                "Only managers may assign todos".to_string(),
            ));
        }

        let requested = assignee_id.clone();
        self.todo_repo
            .transition(id, TodoStatus::InProgress, Some(Some(assignee_id)), move |current| {
                guard_assign(current, &requested)
            })
            .await
    }

    /// The assignee hands the todo over for review.
    pub async fn send_to_review(&self, caller: &Caller, id: &str) -> AppResult<todo::Model> {
        let caller_id = caller.id.clone();
        self.todo_repo
            .transition(id, TodoStatus::InReview, None, move |current| {
                guard_send_to_review(current, &caller_id)
            })
            .await
    }

    /// The creator accepts or rejects a todo in review. Accepting
    /// completes it and clears the assignee; rejecting sends it back
    /// to `in-progress`.
    pub async fn review(
        &self,
        caller: &Caller,
        id: &str,
        decision: ReviewDecision,
    ) -> AppResult<todo::Model> {
        let (base, _) = self.todo_repo.get_by_id(id).await?;

        if base.creator_id.as_deref() != Some(caller.id.as_str()) {
            return Err(AppError::Forbidden(
                "Only the creator may decide on a review".to_string(),
            ));
        }

        let (next, assignee) = match decision {
            ReviewDecision::Accept => (TodoStatus::Completed, Some(None)),
            ReviewDecision::Reject => (TodoStatus::InProgress, None),
        };

        self.todo_repo
            .transition(id, next, assignee, guard_review)
            .await
    }
}

/// Assignment guard: status must be `new` or `in-progress`, and the todo
/// must be unassigned or already assigned to the requested user.
fn guard_assign(current: &todo::Model, requested_assignee: &str) -> AppResult<()> {
    if !matches!(current.status, TodoStatus::New | TodoStatus::InProgress) {
        return Err(AppError::Conflict(format!(
            "Cannot assign a todo in status {:?}",
            current.status
        )));
    }

    match current.assignee_id.as_deref() {
        None => Ok(()),
        Some(existing) if existing == requested_assignee => Ok(()),
        Some(_) => Err(AppError::Conflict(
            "Todo is already assigned to someone else".to_string(),
        )),
    }
}

/// Review handover guard: only the current assignee, only from
/// `in-progress`.
fn guard_send_to_review(current: &todo::Model, caller_id: &str) -> AppResult<()> {
    if current.status != TodoStatus::InProgress {
        return Err(AppError::Conflict(
            "Only an in-progress todo can be sent to review".to_string(),
        ));
    }

    if current.assignee_id.as_deref() != Some(caller_id) {
        return Err(AppError::Forbidden(
            "Only the assignee may send a todo to review".to_string(),
        ));
    }

    Ok(())
}

/// Review decision guard: only valid while the todo sits in review.
fn guard_review(current: &todo::Model) -> AppResult<()> {
    if current.status != TodoStatus::InReview {
        return Err(AppError::Conflict(
            "Todo is not in review".to_string(),
        ));
    }
    Ok(())
}
