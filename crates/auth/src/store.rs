//! Repository interfaces for accounts and tokens.
//!
//! Implementations live in `profiles-infra`; everything here is storage-agnostic.

use std::sync::Arc;

use async_trait::async_trait;

use profiles_core::{AccountId, StoreError};

use crate::{Account, AuthToken, NewAccount};

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account and assign its id.
    ///
    /// Fails with [`StoreError::UniqueViolation`] on `email` when another
    /// account already uses the address.
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Exact lookup by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// All accounts ordered by id, optionally restricted to those whose name
    /// or email contains `search` (case-insensitive).
    async fn list(&self, search: Option<&str>) -> Result<Vec<Account>, StoreError>;

    /// Overwrite the stored row with `account`.
    async fn update(&self, account: &Account) -> Result<(), StoreError>;

    /// Returns `false` if no such account existed.
    async fn delete(&self, id: AccountId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Return the account's token, issuing one on first use.
    async fn get_or_create(&self, account_id: AccountId) -> Result<AuthToken, StoreError>;

    /// Resolve a presented key to its account.
    async fn resolve(&self, key: &str) -> Result<Option<AccountId>, StoreError>;

    async fn revoke_for(&self, account_id: AccountId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        (**self).insert(account).await
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        (**self).get(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<Account>, StoreError> {
        (**self).list(search).await
    }

    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        (**self).update(account).await
    }

    async fn delete(&self, id: AccountId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<S> TokenStore for Arc<S>
where
    S: TokenStore + ?Sized,
{
    async fn get_or_create(&self, account_id: AccountId) -> Result<AuthToken, StoreError> {
        (**self).get_or_create(account_id).await
    }

    async fn resolve(&self, key: &str) -> Result<Option<AccountId>, StoreError> {
        (**self).resolve(key).await
    }

    async fn revoke_for(&self, account_id: AccountId) -> Result<(), StoreError> {
        (**self).revoke_for(account_id).await
    }
}
