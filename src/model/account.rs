use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle state of an account. Only `Active` accounts accept transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Suspended,
    Closed,
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: Decimal,
    pub currency: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum AccountValidationError {
    #[error("currency must be a 3-letter ISO code")]
    InvalidCurrency,
    #[error("account balance cannot be negative")]
    NegativeBalance,
}

impl Account {
    pub fn new(user_id: Uuid, currency: impl Into<String>, balance: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            balance,
            currency: currency.into(),
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(AccountValidationError::InvalidCurrency);
        }
        if self.balance.is_sign_negative() {
            return Err(AccountValidationError::NegativeBalance);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_account_is_active_with_zero_or_positive_balance() {
        let account = Account::new(Uuid::new_v4(), "USD", dec!(100.00));
        assert_eq!(account.status, AccountStatus::Active);
        assert!(account.validate().is_ok());
    }

    #[test]
    fn negative_balance_fails_validation() {
        let mut account = Account::new(Uuid::new_v4(), "USD", dec!(0));
        account.balance = dec!(-1);
        assert!(matches!(
            account.validate(),
            Err(AccountValidationError::NegativeBalance)
        ));
    }

    #[test]
    fn non_three_letter_currency_fails_validation() {
        let account = Account::new(Uuid::new_v4(), "us", dec!(0));
        assert!(matches!(
            account.validate(),
            Err(AccountValidationError::InvalidCurrency)
        ));
    }
}
