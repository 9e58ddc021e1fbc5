//! Business logic services.

pub mod announcement;
pub mod attachment;
pub mod comment;
pub mod info;
pub mod notification;
pub mod poll;
pub mod property;
pub mod todo;
pub mod user;

pub use announcement::AnnouncementService;
pub use attachment::AttachmentService;
pub use comment::CommentService;
pub use info::InfoService;
pub use notification::NotificationService;
pub use poll::PollService;
pub use property::PropertyService;
pub use todo::TodoService;
pub use user::UserService;

/// Resolved caller identity: who is asking, and whether their profile
/// carries the manager flag. Every service operation takes this first.
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: String,
    pub is_manager: bool,
}

impl Caller {
    /// A plain resident caller.
    #[must_use]
    pub fn resident(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_manager: false,
        }
    }

    /// A manager caller.
    #[must_use]
    pub fn manager(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_manager: true,
        }
    }
}
