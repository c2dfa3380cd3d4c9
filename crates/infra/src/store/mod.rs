//! Concrete implementations of the account, token and feed stores.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryAccountStore, InMemoryFeedStore, InMemoryTokenStore};
pub use postgres::{PostgresAccountStore, PostgresFeedStore, PostgresTokenStore};
