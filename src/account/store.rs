use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use thiserror::Error;

use crate::model::{Account, AccountValidationError};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid account: {0}")]
    Invalid(#[from] AccountValidationError),
    #[error("account already exists for this user and currency")]
    DuplicateAccount,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, account: &Account) -> Result<Account, AccountError>;
}

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
    async fn insert(&self, account: &Account) -> Result<Account, AccountError> {
        account.validate()?;

        sqlx::query_as::<Postgres, Account>(
            r#"
            INSERT INTO accounts (id, user_id, balance, currency, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING id, user_id, balance, currency, status, created_at, updated_at
            "#,
        )
        .bind(account.id)
        .bind(account.user_id)
        .bind(account.balance)
        .bind(&account.currency)
        .bind(account.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AccountError::DuplicateAccount
            }
            _ => AccountError::Database(err),
        })
    }
}
