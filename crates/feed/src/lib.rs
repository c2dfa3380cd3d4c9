//! Profile feed domain module (status updates owned by accounts).
//!
//! Pure domain logic plus the repository interface; no IO, no HTTP.

pub mod item;
pub mod store;

pub use item::{FeedItem, FeedItemChanges, NewFeedItem, STATUS_TEXT_MAX_LEN};
pub use store::FeedStore;
