use std::sync::Arc;

use async_trait::async_trait;

use profiles_core::{AccountId, FeedItemId, StoreError};

use crate::{FeedItem, NewFeedItem};

#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn insert(&self, item: NewFeedItem) -> Result<FeedItem, StoreError>;

    async fn get(&self, id: FeedItemId) -> Result<Option<FeedItem>, StoreError>;

    /// All items ordered by id.
    async fn list(&self) -> Result<Vec<FeedItem>, StoreError>;

    /// Persist a changed `status_text`. Owner and timestamp are never written.
    async fn update(&self, item: &FeedItem) -> Result<(), StoreError>;

    /// Returns `false` if no such item existed.
    async fn delete(&self, id: FeedItemId) -> Result<bool, StoreError>;

    /// Remove every item owned by `owner`; returns how many went away.
    async fn delete_by_owner(&self, owner: AccountId) -> Result<u64, StoreError>;
}

#[async_trait]
impl<S> FeedStore for Arc<S>
where
    S: FeedStore + ?Sized,
{
    async fn insert(&self, item: NewFeedItem) -> Result<FeedItem, StoreError> {
        (**self).insert(item).await
    }

    async fn get(&self, id: FeedItemId) -> Result<Option<FeedItem>, StoreError> {
        (**self).get(id).await
    }

    async fn list(&self) -> Result<Vec<FeedItem>, StoreError> {
        (**self).list().await
    }

    async fn update(&self, item: &FeedItem) -> Result<(), StoreError> {
        (**self).update(item).await
    }

    async fn delete(&self, id: FeedItemId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }

    async fn delete_by_owner(&self, owner: AccountId) -> Result<u64, StoreError> {
        (**self).delete_by_owner(owner).await
    }
}
