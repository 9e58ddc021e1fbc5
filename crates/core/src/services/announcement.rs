//! Announcement service: creation, the visibility window and creator-only
//! mutation.

use chrono::{Local, NaiveDate};
use domus_common::{AppError, AppResult, IdGenerator};
use domus_db::{
    entities::{
        announcement::{self, AnnouncementCategory},
        inquiry,
    },
    repositories::{announcement::AnnouncementChange, AnnouncementRepository},
};
use serde::Deserialize;
use validator::Validate;

use super::Caller;
use crate::dates::parse_date_field;

/// Announcement service for business logic.
#[derive(Clone)]
pub struct AnnouncementService {
    announcement_repo: AnnouncementRepository,
    id_gen: IdGenerator,
}

/// Input for creating an announcement.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 8192))]
    pub text: String,

    pub category: Option<AnnouncementCategory>,

    /// Date string; longer timestamps are read by their leading date.
    pub auto_invisible_date: Option<String>,
}

/// Input for updating an announcement.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnnouncementInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 8192))]
    pub text: Option<String>,

    pub category: Option<AnnouncementCategory>,
    pub is_visible: Option<bool>,

    /// `Some(None)` clears the window; `Some(Some(date))` replaces it.
    pub auto_invisible_date: Option<Option<String>>,
}

impl AnnouncementService {
    /// Create a new announcement service.
    #[must_use]
    pub const fn new(announcement_repo: AnnouncementRepository) -> Self {
        Self {
            announcement_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an announcement, visible from the start.
    pub async fn create(
        &self,
        caller: &Caller,
        input: CreateAnnouncementInput,
    ) -> AppResult<(inquiry::Model, announcement::Model)> {
        input.validate()?;

        let auto_invisible_date = input
            .auto_invisible_date
            .as_deref()
            .map(parse_date_field)
            .transpose()?;

        self.announcement_repo
            .create(
                self.id_gen.generate(),
                input.title,
                input.text,
                Some(caller.id.clone()),
                input.category.unwrap_or(AnnouncementCategory::Other),
                auto_invisible_date,
            )
            .await
    }

    /// List announcements the caller may see: those inside their
    /// visibility window, plus the caller's own regardless of window.
    /// Evaluated at read time against the server's local calendar date.
    pub async fn list(
        &self,
        caller: &Caller,
        title: Option<&str>,
    ) -> AppResult<Vec<(inquiry::Model, announcement::Model)>> {
        let today = Local::now().date_naive();
        let rows = self.announcement_repo.find_all(title).await?;

        Ok(rows
            .into_iter()
            .filter(|(base, detail)| is_visible_to(&caller.id, base, detail, today))
            .collect())
    }

    /// Read one announcement. Unrestricted for authenticated callers.
    pub async fn get(&self, id: &str) -> AppResult<(inquiry::Model, announcement::Model)> {
        self.announcement_repo.get_by_id(id).await
    }

    /// Update an announcement. Creator only.
    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        input: UpdateAnnouncementInput,
    ) -> AppResult<(inquiry::Model, announcement::Model)> {
        input.validate()?;

        let (base, _) = self.announcement_repo.get_by_id(id).await?;
        ensure_creator(caller, &base)?;

        let auto_invisible_date = match input.auto_invisible_date {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => Some(Some(parse_date_field(&raw)?)),
        };

        self.announcement_repo
            .update(
                id,
                AnnouncementChange {
                    title: input.title,
                    text: input.text,
                    category: input.category,
                    is_visible: input.is_visible,
                    auto_invisible_date,
                },
            )
            .await
    }

    /// Delete an announcement. Creator only.
    pub async fn delete(&self, caller: &Caller, id: &str) -> AppResult<()> {
        let (base, _) = self.announcement_repo.get_by_id(id).await?;
        ensure_creator(caller, &base)?;

        self.announcement_repo.delete(id).await
    }
}

fn ensure_creator(caller: &Caller, base: &inquiry::Model) -> AppResult<()> {
    if base.creator_id.as_deref() == Some(caller.id.as_str()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the creator may modify this announcement".to_string(),
        ))
    }
}

/// The visibility window rule: visible flag set and the auto-invisible
/// date strictly in the future (or absent), or the caller is the creator.
fn is_visible_to(
    caller_id: &str,
    base: &inquiry::Model,
    detail: &announcement::Model,
    today: NaiveDate,
) -> bool {
    if base.creator_id.as_deref() == Some(caller_id) {
        return true;
    }

    detail.is_visible
        && detail
            .auto_invisible_date
            .is_none_or(|date| date > today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_base(id: &str, creator: &str) -> inquiry::Model {
        inquiry::Model {
            id: id.to_string(),
            title: "Water shutoff".to_string(),
            text: "Tuesday 9-12".to_string(),
            creator_id: Some(creator.to_string()),
            created_at: Utc::now().fixed_offset(),
            updated_at: None,
        }
    }

    fn test_detail(id: &str, is_visible: bool, date: Option<NaiveDate>) -> announcement::Model {
        announcement::Model {
            inquiry_id: id.to_string(),
            is_visible,
            auto_invisible_date: date,
            category: AnnouncementCategory::UtilityOutage,
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    #[test]
    fn test_window_hides_expired_from_non_creator() {
        let yesterday = today() - Duration::days(1);
        let base = test_base("a1", "creator");
        let detail = test_detail("a1", true, Some(yesterday));

        assert!(!is_visible_to("other", &base, &detail, today()));
        assert!(is_visible_to("creator", &base, &detail, today()));
    }

    #[test]
    fn test_window_expiry_is_strict() {
        // An announcement expiring today is already invisible.
        let base = test_base("a1", "creator");
        let detail = test_detail("a1", true, Some(today()));

        assert!(!is_visible_to("other", &base, &detail, today()));
    }

    #[test]
    fn test_window_open_ended_when_date_absent() {
        let base = test_base("a1", "creator");
        let detail = test_detail("a1", true, None);

        assert!(is_visible_to("other", &base, &detail, today()));
    }

    #[test]
    fn test_hidden_flag_overrides_window() {
        let tomorrow = today() + Duration::days(1);
        let base = test_base("a1", "creator");
        let detail = test_detail("a1", false, Some(tomorrow));

        assert!(!is_visible_to("other", &base, &detail, today()));
        assert!(is_visible_to("creator", &base, &detail, today()));
    }

    #[tokio::test]
    async fn test_list_filters_expired_for_non_creator() {
        let yesterday = today() - Duration::days(1);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    (test_detail("a1", true, Some(yesterday)), test_base("a1", "creator")),
                    (test_detail("a2", true, None), test_base("a2", "creator")),
                ]])
                .into_connection(),
        );

        let service = AnnouncementService::new(AnnouncementRepository::new(db));
        let visible = service.list(&Caller::resident("other"), None).await.unwrap();

        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].0.id, "a2");
    }

    #[tokio::test]
    async fn test_list_keeps_own_expired_announcements() {
        let yesterday = today() - Duration::days(1);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(
                    test_detail("a1", true, Some(yesterday)),
                    test_base("a1", "creator"),
                )]])
                .into_connection(),
        );

        let service = AnnouncementService::new(AnnouncementRepository::new(db));
        let visible = service
            .list(&Caller::resident("creator"), None)
            .await
            .unwrap();

        assert_eq!(visible.len(), 1);
    }

    #[tokio::test]
    async fn test_update_denied_for_non_creator() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[(
                    test_detail("a1", true, None),
                    test_base("a1", "creator"),
                )]])
                .into_connection(),
        );

        let service = AnnouncementService::new(AnnouncementRepository::new(db));
        let err = service
            .update(
                &Caller::manager("mgr"),
                "a1",
                UpdateAnnouncementInput::default(),
            )
            .await
            .unwrap_err();

        // Creator-only: even managers are denied here.
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
