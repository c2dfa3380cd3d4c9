//! Postgres-backed stores.
//!
//! Every operation is a single statement (token issuance is an insert that
//! tolerates a race, followed by a read), so no explicit transactions are
//! needed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use profiles_auth::{Account, AccountStore, AuthToken, NewAccount, PasswordHash, TokenKey, TokenStore};
use profiles_core::{AccountId, FeedItemId, StoreError};
use profiles_feed::{FeedItem, FeedStore, NewFeedItem};

/// Idempotent schema bootstrap, one statement per entry.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id BIGSERIAL PRIMARY KEY,
        email VARCHAR(255) NOT NULL UNIQUE,
        name VARCHAR(255) NOT NULL,
        password_hash TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        is_staff BOOLEAN NOT NULL DEFAULT FALSE,
        is_superuser BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS feed_items (
        id BIGSERIAL PRIMARY KEY,
        owner_id BIGINT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        status_text VARCHAR(255) NOT NULL,
        created_on TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS feed_items_owner_idx ON feed_items (owner_id)",
    r#"
    CREATE TABLE IF NOT EXISTS auth_tokens (
        key VARCHAR(40) PRIMARY KEY,
        account_id BIGINT NOT NULL UNIQUE REFERENCES accounts(id) ON DELETE CASCADE,
        created TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Connect to Postgres and make sure the schema exists.
pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPool::connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;
    ensure_schema(&pool).await?;
    Ok(pool)
}

pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    tracing::info!("database schema ready");
    Ok(())
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::UniqueViolation { field: "email" }
        }
        _ => {
            tracing::error!(operation, error = %err, "postgres operation failed");
            StoreError::backend(format!("{operation}: {err}"))
        }
    }
}

/// Escape LIKE metacharacters so user input only matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

const ACCOUNT_COLUMNS: &str = "id, email, name, password_hash, is_active, is_staff, is_superuser";

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: AccountId::new(row.try_get("id")?),
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        password_hash: PasswordHash::from_stored(row.try_get::<String, _>("password_hash")?),
        is_active: row.try_get("is_active")?,
        is_staff: row.try_get("is_staff")?,
        is_superuser: row.try_get("is_superuser")?,
    })
}

#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let sql = format!(
            "INSERT INTO accounts (email, name, password_hash, is_active, is_staff, is_superuser) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&account.email)
            .bind(&account.name)
            .bind(account.password_hash.as_str())
            .bind(account.is_active)
            .bind(account.is_staff)
            .bind(account.is_superuser)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_account", e))?;
        account_from_row(&row).map_err(|e| map_sqlx_error("insert_account", e))
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_account", e))?;
        row.as_ref()
            .map(account_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_account", e))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_account_by_email", e))?;
        row.as_ref()
            .map(account_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_account_by_email", e))
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<Account>, StoreError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1) \
             ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(search.map(like_pattern))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_accounts", e))?;
        rows.iter()
            .map(account_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_accounts", e))
    }

    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET email = $2,
                name = $3,
                password_hash = $4,
                is_active = $5,
                is_staff = $6,
                is_superuser = $7
            WHERE id = $1
            "#,
        )
        .bind(account.id.get())
        .bind(&account.email)
        .bind(&account.name)
        .bind(account.password_hash.as_str())
        .bind(account.is_active)
        .bind(account.is_staff)
        .bind(account.is_superuser)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_account", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: AccountId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_account", e))?;
        Ok(result.rows_affected() > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokens
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PostgresTokenStore {
    pool: PgPool,
}

impl PostgresTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PostgresTokenStore {
    async fn get_or_create(&self, account_id: AccountId) -> Result<AuthToken, StoreError> {
        let candidate = AuthToken::issue(account_id, Utc::now());
        sqlx::query(
            "INSERT INTO auth_tokens (key, account_id, created) VALUES ($1, $2, $3) \
             ON CONFLICT (account_id) DO NOTHING",
        )
        .bind(candidate.key.as_str())
        .bind(account_id.get())
        .bind(candidate.created)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("issue_token", e))?;

        let row = sqlx::query("SELECT key, created FROM auth_tokens WHERE account_id = $1")
            .bind(account_id.get())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_token", e))?;

        let key: String = row.try_get("key").map_err(|e| map_sqlx_error("load_token", e))?;
        let created: DateTime<Utc> = row
            .try_get("created")
            .map_err(|e| map_sqlx_error("load_token", e))?;
        Ok(AuthToken {
            key: TokenKey::from_stored(key),
            account_id,
            created,
        })
    }

    async fn resolve(&self, key: &str) -> Result<Option<AccountId>, StoreError> {
        let row = sqlx::query("SELECT account_id FROM auth_tokens WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("resolve_token", e))?;
        match row {
            Some(row) => {
                let id: i64 = row
                    .try_get("account_id")
                    .map_err(|e| map_sqlx_error("resolve_token", e))?;
                Ok(Some(AccountId::new(id)))
            }
            None => Ok(None),
        }
    }

    async fn revoke_for(&self, account_id: AccountId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM auth_tokens WHERE account_id = $1")
            .bind(account_id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("revoke_token", e))?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Feed
// ─────────────────────────────────────────────────────────────────────────────

fn feed_item_from_row(row: &PgRow) -> Result<FeedItem, sqlx::Error> {
    Ok(FeedItem {
        id: FeedItemId::new(row.try_get("id")?),
        owner: AccountId::new(row.try_get("owner_id")?),
        status_text: row.try_get("status_text")?,
        created_on: row.try_get("created_on")?,
    })
}

#[derive(Debug, Clone)]
pub struct PostgresFeedStore {
    pool: PgPool,
}

impl PostgresFeedStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedStore for PostgresFeedStore {
    async fn insert(&self, item: NewFeedItem) -> Result<FeedItem, StoreError> {
        let row = sqlx::query(
            "INSERT INTO feed_items (owner_id, status_text, created_on) VALUES ($1, $2, $3) \
             RETURNING id, owner_id, status_text, created_on",
        )
        .bind(item.owner.get())
        .bind(&item.status_text)
        .bind(item.created_on)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_feed_item", e))?;
        feed_item_from_row(&row).map_err(|e| map_sqlx_error("insert_feed_item", e))
    }

    async fn get(&self, id: FeedItemId) -> Result<Option<FeedItem>, StoreError> {
        let row = sqlx::query(
            "SELECT id, owner_id, status_text, created_on FROM feed_items WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_feed_item", e))?;
        row.as_ref()
            .map(feed_item_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_feed_item", e))
    }

    async fn list(&self) -> Result<Vec<FeedItem>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, status_text, created_on FROM feed_items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_feed_items", e))?;
        rows.iter()
            .map(feed_item_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_feed_items", e))
    }

    async fn update(&self, item: &FeedItem) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE feed_items SET status_text = $2 WHERE id = $1")
            .bind(item.id.get())
            .bind(&item.status_text)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_feed_item", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: FeedItemId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM feed_items WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_feed_item", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_owner(&self, owner: AccountId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM feed_items WHERE owner_id = $1")
            .bind(owner.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_feed_items_by_owner", e))?;
        Ok(result.rows_affected())
    }
}
