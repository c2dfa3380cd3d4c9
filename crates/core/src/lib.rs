//! `profiles-core`: shared domain primitives (ids, errors, entity marker).
//!
//! Nothing in here knows about HTTP or storage engines.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldErrors, StoreError};
pub use id::{AccountId, FeedItemId};
