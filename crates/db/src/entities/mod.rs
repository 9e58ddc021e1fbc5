//! Database entities.

pub mod announcement;
pub mod attachment;
pub mod comment;
pub mod info;
pub mod inquiry;
pub mod notification;
pub mod ownership;
pub mod poll;
pub mod profile;
pub mod property;
pub mod todo;
pub mod user;
pub mod vote;
pub mod vote_option;

pub use announcement::Entity as Announcement;
pub use attachment::Entity as Attachment;
pub use comment::Entity as Comment;
pub use info::Entity as Info;
pub use inquiry::Entity as Inquiry;
pub use notification::Entity as Notification;
pub use ownership::Entity as Ownership;
pub use poll::Entity as Poll;
pub use profile::Entity as Profile;
pub use property::Entity as Property;
pub use todo::Entity as Todo;
pub use user::Entity as User;
pub use vote::Entity as Vote;
pub use vote_option::Entity as VoteOption;
