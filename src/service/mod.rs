//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate database writes and media uploads.

mod account;
mod gallery;
pub mod images;
mod links;
mod messages;
mod profile;
mod reorder;
mod thoughts;
mod works;

pub use account::{AccountService, MIN_PASSWORD_CHARS};
pub use gallery::{GalleryInput, GalleryService};
pub use links::{LinkInput, LinkService};
pub use messages::{MessageService, NewMessage, ValidMessage, record_submission};
pub use profile::{MAX_ABOUT_IMAGES, ProfileInput, ProfileService, SavedProfile};
pub use thoughts::{ThoughtInput, ThoughtService};
pub use works::{ALL_CATEGORIES, WorkInput, WorkService};
