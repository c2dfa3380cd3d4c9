//! In-memory stores for tests/dev.
//!
//! Each store keeps its rows behind one `RwLock`, so every write is a single
//! critical section.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use profiles_auth::{Account, AccountStore, AuthToken, NewAccount, TokenStore};
use profiles_core::{AccountId, Entity, FeedItemId, StoreError};
use profiles_feed::{FeedItem, FeedStore, NewFeedItem};

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| StoreError::backend("lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|_| StoreError::backend("lock poisoned"))
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct AccountTable {
    rows: BTreeMap<AccountId, Account>,
    last_id: i64,
}

impl AccountTable {
    fn email_in_use(&self, email: &str, except: Option<AccountId>) -> bool {
        self.rows
            .values()
            .any(|a| a.email == email && Some(a.id) != except)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<AccountTable>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut table = write(&self.inner)?;
        if table.email_in_use(&account.email, None) {
            return Err(StoreError::UniqueViolation { field: "email" });
        }

        table.last_id += 1;
        let stored = Account {
            id: AccountId::new(table.last_id),
            email: account.email,
            name: account.name,
            password_hash: account.password_hash,
            is_active: account.is_active,
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
        };
        table.rows.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(read(&self.inner)?.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(read(&self.inner)?
            .rows
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<Account>, StoreError> {
        let table = read(&self.inner)?;
        let needle = search.map(str::to_lowercase);
        Ok(table
            .rows
            .values()
            .filter(|a| match &needle {
                Some(n) => contains_ci(&a.name, n) || contains_ci(&a.email, n),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        let mut table = write(&self.inner)?;
        if !table.rows.contains_key(&account.id) {
            return Err(StoreError::NotFound);
        }
        if table.email_in_use(&account.email, Some(account.id)) {
            return Err(StoreError::UniqueViolation { field: "email" });
        }
        table.rows.insert(account.id, account.clone());
        Ok(())
    }

    async fn delete(&self, id: AccountId) -> Result<bool, StoreError> {
        Ok(write(&self.inner)?.rows.remove(&id).is_some())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokens
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct TokenTable {
    by_account: HashMap<AccountId, AuthToken>,
    by_key: HashMap<String, AccountId>,
}

#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    inner: RwLock<TokenTable>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get_or_create(&self, account_id: AccountId) -> Result<AuthToken, StoreError> {
        let mut table = write(&self.inner)?;
        if let Some(existing) = table.by_account.get(&account_id) {
            return Ok(existing.clone());
        }

        let token = AuthToken::issue(account_id, Utc::now());
        table
            .by_key
            .insert(token.key.as_str().to_string(), account_id);
        table.by_account.insert(account_id, token.clone());
        Ok(token)
    }

    async fn resolve(&self, key: &str) -> Result<Option<AccountId>, StoreError> {
        Ok(read(&self.inner)?.by_key.get(key).copied())
    }

    async fn revoke_for(&self, account_id: AccountId) -> Result<(), StoreError> {
        let mut table = write(&self.inner)?;
        if let Some(token) = table.by_account.remove(&account_id) {
            table.by_key.remove(token.key.as_str());
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Feed
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct FeedTable {
    rows: BTreeMap<FeedItemId, FeedItem>,
    last_id: i64,
}

#[derive(Debug, Default)]
pub struct InMemoryFeedStore {
    inner: RwLock<FeedTable>,
}

impl InMemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    async fn insert(&self, item: NewFeedItem) -> Result<FeedItem, StoreError> {
        let mut table = write(&self.inner)?;
        table.last_id += 1;
        let stored = FeedItem {
            id: FeedItemId::new(table.last_id),
            owner: item.owner,
            status_text: item.status_text,
            created_on: item.created_on,
        };
        table.rows.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: FeedItemId) -> Result<Option<FeedItem>, StoreError> {
        Ok(read(&self.inner)?.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<FeedItem>, StoreError> {
        Ok(read(&self.inner)?.rows.values().cloned().collect())
    }

    async fn update(&self, item: &FeedItem) -> Result<(), StoreError> {
        let mut table = write(&self.inner)?;
        let Some(row) = table.rows.get_mut(&item.id) else {
            return Err(StoreError::NotFound);
        };
        row.status_text = item.status_text.clone();
        Ok(())
    }

    async fn delete(&self, id: FeedItemId) -> Result<bool, StoreError> {
        Ok(write(&self.inner)?.rows.remove(&id).is_some())
    }

    async fn delete_by_owner(&self, owner: AccountId) -> Result<u64, StoreError> {
        let mut table = write(&self.inner)?;
        let before = table.rows.len();
        table.rows.retain(|_, item| item.owner != owner);
        Ok((before - table.rows.len()) as u64)
    }
}
