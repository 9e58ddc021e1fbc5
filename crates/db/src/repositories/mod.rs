//! Repository layer for database access.

pub mod announcement;
pub mod attachment;
pub mod comment;
pub mod info;
pub mod notification;
pub mod poll;
pub mod profile;
pub mod property;
pub mod todo;
pub mod user;

pub use announcement::AnnouncementRepository;
pub use attachment::AttachmentRepository;
pub use comment::CommentRepository;
pub use info::InfoRepository;
pub use notification::NotificationRepository;
pub use poll::PollRepository;
pub use profile::ProfileRepository;
pub use property::PropertyRepository;
pub use todo::TodoRepository;
pub use user::UserRepository;

/// Escape LIKE metacharacters in a user-supplied pattern fragment.
pub(crate) fn escape_like(fragment: &str) -> String {
    fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
    }
}
