use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The two operations this ledger understands. Transfers, reversals and
/// adjustments are out of scope; see the processor's error taxonomy for how
/// anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub currency: String,
    pub reference_id: Uuid,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionValidationError {
    #[error("amount must be a positive value")]
    InvalidAmount,
    #[error("currency must be a 3-letter ISO code")]
    InvalidCurrency,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        transaction_type: TransactionType,
        amount: Decimal,
        currency: impl Into<String>,
        reference_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            transaction_type,
            amount,
            currency: currency.into(),
            reference_id,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(TransactionValidationError::InvalidAmount);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(TransactionValidationError::InvalidCurrency);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample(amount: Decimal, currency: &str) -> Transaction {
        Transaction::new(
            Uuid::new_v4(),
            TransactionType::Deposit,
            amount,
            currency,
            Uuid::new_v4(),
        )
    }

    #[test]
    fn new_transaction_starts_pending() {
        let txn = sample(dec!(10.00), "USD");
        assert_eq!(txn.status, TransactionStatus::Pending);
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn zero_or_negative_amount_is_invalid() {
        assert_eq!(
            sample(dec!(0), "USD").validate(),
            Err(TransactionValidationError::InvalidAmount)
        );
        assert_eq!(
            sample(dec!(-5), "USD").validate(),
            Err(TransactionValidationError::InvalidAmount)
        );
    }

    #[test]
    fn malformed_currency_is_invalid() {
        assert_eq!(
            sample(dec!(10), "dollars").validate(),
            Err(TransactionValidationError::InvalidCurrency)
        );
    }
}
