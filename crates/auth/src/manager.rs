//! Account lifecycle: creation, profile/password updates, login checks.
//!
//! This is the only place that builds [`NewAccount`] values, so every stored
//! account has gone through email normalization and password hashing.

use std::sync::Arc;

use thiserror::Error;

use profiles_core::{AccountId, DomainError, FieldErrors, StoreError};

use crate::account::{check_password, clean_email, clean_name, email_taken, normalize_email};
use crate::password::{PasswordError, PasswordHash, PasswordHasher};
use crate::{Account, AccountChanges, AccountFlags, AccountStore, FlagChanges, NewAccount, Principal};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("unable to log in with provided credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { field: "email" } => Self::Domain(email_taken()),
            StoreError::UniqueViolation { field } => {
                Self::Domain(DomainError::validation(field, "already exists"))
            }
            StoreError::NotFound => Self::Domain(DomainError::NotFound),
            other => Self::Store(other),
        }
    }
}

/// Builds and mutates accounts on top of an [`AccountStore`].
#[derive(Clone)]
pub struct AccountManager {
    store: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
}

impl AccountManager {
    pub fn new(store: Arc<dyn AccountStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Create a regular account.
    ///
    /// `email` must be non-blank; it is normalized before storage. Without a
    /// password the account gets an unusable hash and cannot log in.
    pub async fn create_account(
        &self,
        email: &str,
        name: &str,
        password: Option<&str>,
    ) -> Result<Account, AccountError> {
        let new = self.prepare(email, name, password, AccountFlags::default())?;
        let account = self.store.insert(new).await?;
        tracing::info!(account_id = %account.id, "account created");
        Ok(account)
    }

    /// Create an account with `is_staff` and `is_superuser` set.
    pub async fn create_privileged_account(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Account, AccountError> {
        let flags = AccountFlags {
            is_active: true,
            is_staff: true,
            is_superuser: true,
        };
        let new = self.prepare(email, name, Some(password), flags)?;
        let account = self.store.insert(new).await?;
        tracing::info!(account_id = %account.id, "privileged account created");
        Ok(account)
    }

    /// Replace the account's password hash and persist it. Blank passwords
    /// are rejected.
    pub async fn update_password(
        &self,
        account: &mut Account,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let mut errors = FieldErrors::new();
        check_password(new_password, &mut errors);
        errors.into_result()?;

        account.password_hash = self.hasher.hash(new_password)?;
        self.store.update(account).await?;
        tracing::info!(account_id = %account.id, "password updated");
        Ok(())
    }

    /// Apply owner-editable changes in a single write.
    pub async fn update_profile(
        &self,
        account: &mut Account,
        changes: AccountChanges,
    ) -> Result<(), AccountError> {
        let mut errors = FieldErrors::new();
        let email = changes.email.as_deref().map(|e| clean_email(e, &mut errors));
        let name = changes.name.as_deref().map(|n| clean_name(n, &mut errors));
        if let Some(password) = changes.password.as_deref() {
            check_password(password, &mut errors);
        }
        errors.into_result()?;

        if let Some(Some(email)) = email {
            account.email = email;
        }
        if let Some(Some(name)) = name {
            account.name = name;
        }
        if let Some(password) = changes.password.as_deref() {
            account.password_hash = self.hasher.hash(password)?;
        }

        self.store.update(account).await?;
        tracing::info!(
            account_id = %account.id,
            password_changed = changes.password.is_some(),
            "profile updated"
        );
        Ok(())
    }

    /// Check login credentials.
    ///
    /// Unknown email, inactive account, unusable hash and wrong password all
    /// fail the same way. An unknown email still pays for one hash.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AccountError> {
        let email = normalize_email(email);
        let Some(account) = self.store.find_by_email(&email).await? else {
            self.hasher.verify_missing(password);
            tracing::debug!("login attempt for unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &account.password_hash) {
            tracing::debug!(account_id = %account.id, "login attempt with wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        if !account.is_active {
            tracing::debug!(account_id = %account.id, "login attempt for inactive account");
            return Err(AccountError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Change login/privilege flags. Superusers only.
    pub async fn set_flags(
        &self,
        actor: &Principal,
        account: &mut Account,
        changes: FlagChanges,
    ) -> Result<(), AccountError> {
        if !actor.is_superuser {
            return Err(DomainError::forbidden("only superusers may change account flags").into());
        }

        if let Some(v) = changes.is_active {
            account.is_active = v;
        }
        if let Some(v) = changes.is_staff {
            account.is_staff = v;
        }
        if let Some(v) = changes.is_superuser {
            account.is_superuser = v;
        }

        self.store.update(account).await?;
        tracing::info!(
            actor_id = %actor.id(),
            account_id = %account.id,
            is_active = account.is_active,
            is_staff = account.is_staff,
            is_superuser = account.is_superuser,
            "account flags changed"
        );
        Ok(())
    }

    pub async fn get(&self, id: AccountId) -> Result<Account, AccountError> {
        self.store
            .get(id)
            .await?
            .ok_or(AccountError::Domain(DomainError::NotFound))
    }

    /// Exact lookup by email; the input is normalized first.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        Ok(self.store.find_by_email(&normalize_email(email)).await?)
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Account>, AccountError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.store.list(search).await?)
    }

    /// Remove the account row. Dependent rows are the caller's concern.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), AccountError> {
        if !self.store.delete(id).await? {
            return Err(DomainError::NotFound.into());
        }
        tracing::info!(account_id = %id, "account deleted");
        Ok(())
    }

    fn prepare(
        &self,
        email: &str,
        name: &str,
        password: Option<&str>,
        flags: AccountFlags,
    ) -> Result<NewAccount, AccountError> {
        let mut errors = FieldErrors::new();
        let email = clean_email(email, &mut errors);
        let name = clean_name(name, &mut errors);
        if let Some(plaintext) = password {
            check_password(plaintext, &mut errors);
        }

        let (Some(email), Some(name), true) = (email, name, errors.is_empty()) else {
            return Err(DomainError::Validation(errors).into());
        };

        let password_hash = match password {
            Some(plaintext) => self.hasher.hash(plaintext)?,
            None => PasswordHash::unusable(),
        };

        Ok(NewAccount {
            email,
            name,
            password_hash,
            is_active: flags.is_active,
            is_staff: flags.is_staff,
            is_superuser: flags.is_superuser,
        })
    }
}

impl core::fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccountManager")
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}
