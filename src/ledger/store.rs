use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Row};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Account, AccountStatus, Transaction, TransactionStatus, TransactionType};

/// Every way `apply_transaction` can fail, split along the retry/permanent
/// line drawn in the processor. Infrastructure errors (`Database`) are the
/// only retryable member; everything else is determined by the payload and
/// the account row at the moment of the first attempt.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("duplicate transaction")]
    DuplicateTransaction,
    #[error("account not found")]
    AccountNotFound,
    #[error("account not active")]
    AccountNotActive,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("invalid transaction type")]
    InvalidTransactionType,
    #[error("currency mismatch")]
    CurrencyMismatch,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl LedgerError {
    /// True for errors that are fully determined by the transaction payload
    /// and account state, where a retry can never produce a different
    /// outcome.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, LedgerError::Database(_))
    }
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn apply_transaction(&self, txn: &Transaction) -> Result<(), LedgerError>;
    async fn get_account(&self, account_id: Uuid) -> Result<Account, LedgerError>;
    async fn get_account_balance(&self, account_id: Uuid) -> Result<Decimal, LedgerError>;
}

pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    /// Applies one transaction atomically: idempotency probe, row-locked
    /// account read, balance arithmetic, balance write, ledger insert.
    /// Mirrors the original store's `ProcessTransaction` step for step.
    async fn apply_transaction(&self, txn: &Transaction) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query(
            "SELECT id FROM transactions WHERE reference_id = $1 AND currency = $2",
        )
        .bind(txn.reference_id)
        .bind(&txn.currency)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            return Err(LedgerError::DuplicateTransaction);
        }

        let account_row = sqlx::query(
            "SELECT id, balance, currency, status FROM accounts WHERE id = $1 FOR UPDATE",
        )
        .bind(txn.account_id)
        .fetch_optional(&mut *tx)
        .await?;

        let account_row = match account_row {
            Some(row) => row,
            None => return Err(LedgerError::AccountNotFound),
        };

        let balance: Decimal = account_row.try_get("balance")?;
        let currency: String = account_row.try_get("currency")?;
        let status: AccountStatus = account_row.try_get("status")?;

        if status != AccountStatus::Active {
            return Err(LedgerError::AccountNotActive);
        }

        if txn.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        if currency != txn.currency {
            return Err(LedgerError::CurrencyMismatch);
        }

        let new_balance = match txn.transaction_type {
            TransactionType::Deposit => balance + txn.amount,
            TransactionType::Withdrawal => {
                if balance < txn.amount {
                    return Err(LedgerError::InsufficientFunds);
                }
                balance - txn.amount
            }
        };

        sqlx::query("UPDATE accounts SET balance = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_balance)
            .bind(txn.account_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO transactions (id, account_id, amount, type, reference_id, currency, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            "#,
        )
        .bind(txn.id)
        .bind(txn.account_id)
        .bind(txn.amount)
        .bind(txn.transaction_type)
        .bind(txn.reference_id)
        .bind(&txn.currency)
        .bind(TransactionStatus::Completed)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_account(&self, account_id: Uuid) -> Result<Account, LedgerError> {
        sqlx::query_as::<Postgres, Account>(
            "SELECT id, user_id, balance, currency, status, created_at, updated_at FROM accounts WHERE id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(LedgerError::AccountNotFound)
    }

    async fn get_account_balance(&self, account_id: Uuid) -> Result<Decimal, LedgerError> {
        let row = sqlx::query("SELECT balance FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(LedgerError::AccountNotFound)?;
        Ok(row.try_get("balance")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_are_the_only_retryable_kind() {
        assert!(!LedgerError::Database(sqlx::Error::RowNotFound).is_permanent());
        assert!(LedgerError::DuplicateTransaction.is_permanent());
        assert!(LedgerError::AccountNotFound.is_permanent());
        assert!(LedgerError::AccountNotActive.is_permanent());
        assert!(LedgerError::InsufficientFunds.is_permanent());
        assert!(LedgerError::InvalidAmount.is_permanent());
        assert!(LedgerError::InvalidTransactionType.is_permanent());
    }
}
