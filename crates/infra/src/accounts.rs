//! User account persistence.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use airhouse_auth::{UserAccount, normalize_email};
use airhouse_core::UserId;

use crate::store::postgres::map_sqlx_error;
use crate::store::{StoreError, StoreResult};

#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account. `Conflict` when the email is already registered.
    async fn insert(&self, account: UserAccount) -> StoreResult<UserAccount>;

    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;

    async fn get(&self, id: UserId) -> StoreResult<UserAccount>;
}

#[async_trait::async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn insert(&self, account: UserAccount) -> StoreResult<UserAccount> {
        (**self).insert(account).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        (**self).find_by_email(email).await
    }

    async fn get(&self, id: UserId) -> StoreResult<UserAccount> {
        (**self).get(id).await
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<UserId, UserAccount>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, account: UserAccount) -> StoreResult<UserAccount> {
        let mut map = self.accounts.write().map_err(|_| StoreError::poisoned())?;
        let email = normalize_email(&account.email);
        if map.values().any(|a| normalize_email(&a.email) == email) {
            return Err(StoreError::Conflict(format!("email {email} already registered")));
        }
        map.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let map = self.accounts.read().map_err(|_| StoreError::poisoned())?;
        let email = normalize_email(email);
        Ok(map.values().find(|a| normalize_email(&a.email) == email).cloned())
    }

    async fn get(&self, id: UserId) -> StoreResult<UserAccount> {
        let map = self.accounts.read().map_err(|_| StoreError::poisoned())?;
        map.get(&id).cloned().ok_or(StoreError::NotFound)
    }
}

/// Accounts in the `users` table (see [`crate::store::postgres::migrate`]).
#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait::async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self, account), fields(user_id = %account.id), err)]
    async fn insert(&self, account: UserAccount) -> StoreResult<UserAccount> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(account.id.as_uuid())
        .bind(normalize_email(&account.email))
        .bind(&account.password_hash)
        .bind(account.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(account)
    }

    #[instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE lower(email) = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.as_ref().map(account_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get(&self, id: UserId) -> StoreResult<UserAccount> {
        let row = sqlx::query("SELECT id, email, password_hash, created_at FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;

        row.as_ref().map(account_from_row).transpose()?.ok_or(StoreError::NotFound)
    }
}

fn account_from_row(row: &PgRow) -> StoreResult<UserAccount> {
    let decode = |e: sqlx::Error| StoreError::Backend(format!("failed to decode user row: {e}"));
    Ok(UserAccount {
        id: UserId::from_uuid(row.try_get("id").map_err(decode)?),
        email: row.try_get("email").map_err(decode)?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}
