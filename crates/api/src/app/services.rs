//! Store wiring shared by all handlers.
//!
//! `AppServices` owns the account manager plus the token and feed stores, and
//! is the one place that coordinates writes spanning more than one of them.

use std::sync::Arc;

use profiles_auth::{
    Account, AccountError, AccountManager, AccountStore, AuthToken, PasswordHasher, TokenStore,
};
use profiles_core::{AccountId, DomainError, StoreError};
use profiles_feed::FeedStore;
use profiles_infra::store::{
    InMemoryAccountStore, InMemoryFeedStore, InMemoryTokenStore, PostgresAccountStore,
    PostgresFeedStore, PostgresTokenStore, postgres,
};

use crate::config::BootstrapSuperuser;

pub struct AppServices {
    accounts: AccountManager,
    tokens: Arc<dyn TokenStore>,
    feed: Arc<dyn FeedStore>,
}

impl AppServices {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tokens: Arc<dyn TokenStore>,
        feed: Arc<dyn FeedStore>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            accounts: AccountManager::new(accounts, hasher),
            tokens,
            feed,
        }
    }

    pub fn in_memory(hasher: PasswordHasher) -> Self {
        tracing::info!("using in-memory stores");
        Self::new(
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryTokenStore::new()),
            Arc::new(InMemoryFeedStore::new()),
            hasher,
        )
    }

    pub async fn postgres(database_url: &str, hasher: PasswordHasher) -> Result<Self, StoreError> {
        let pool = postgres::connect(database_url).await?;
        tracing::info!("using postgres stores");
        Ok(Self::new(
            Arc::new(PostgresAccountStore::new(pool.clone())),
            Arc::new(PostgresTokenStore::new(pool.clone())),
            Arc::new(PostgresFeedStore::new(pool)),
            hasher,
        ))
    }

    pub fn accounts(&self) -> &AccountManager {
        &self.accounts
    }

    pub fn feed(&self) -> &dyn FeedStore {
        self.feed.as_ref()
    }

    /// Check credentials and hand out the account's token (reused if one
    /// was issued before).
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthToken, AccountError> {
        let account = self.accounts.authenticate(email, password).await?;
        let token = self.tokens.get_or_create(account.id).await?;
        tracing::info!(account_id = %account.id, "login succeeded");
        Ok(token)
    }

    /// Look up the account behind a token key.
    pub async fn resolve_token(&self, key: &str) -> Result<Option<Account>, AccountError> {
        let Some(account_id) = self.tokens.resolve(key).await? else {
            return Ok(None);
        };
        match self.accounts.get(account_id).await {
            Ok(account) => Ok(Some(account)),
            Err(AccountError::Domain(DomainError::NotFound)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete an account together with its feed items and token.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), AccountError> {
        let removed = self.feed.delete_by_owner(id).await?;
        self.tokens.revoke_for(id).await?;
        self.accounts.delete_account(id).await?;
        tracing::info!(account_id = %id, feed_items_removed = removed, "account removed with dependents");
        Ok(())
    }

    /// Create the configured superuser unless its email is already taken.
    pub async fn ensure_superuser(&self, su: &BootstrapSuperuser) -> Result<(), AccountError> {
        if self.accounts.find_by_email(&su.email).await?.is_some() {
            tracing::info!("bootstrap superuser already present");
            return Ok(());
        }
        let account = self
            .accounts
            .create_privileged_account(&su.email, &su.name, &su.password)
            .await?;
        tracing::info!(account_id = %account.id, "bootstrap superuser created");
        Ok(())
    }
}

impl core::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppServices")
            .field("accounts", &self.accounts)
            .finish_non_exhaustive()
    }
}
