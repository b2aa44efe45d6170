use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::account::store::{AccountError, AccountStore};
use crate::model::Account;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub user_id: Uuid,
    pub currency: String,
    pub initial_balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: Decimal,
    pub currency: String,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            balance: a.balance,
            currency: a.currency,
            status: a.status.to_string(),
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub async fn create_account(
        &self,
        request: CreateAccountRequest,
    ) -> Result<Account, AccountError> {
        let account = Account::new(
            request.user_id,
            request.currency.to_uppercase(),
            request.initial_balance,
        );

        match self.store.insert(&account).await {
            Ok(stored) => {
                info!(account_id = %stored.id, "account created successfully");
                Ok(stored)
            }
            Err(err) => {
                error!(account_id = %account.id, error = %err, "failed to create account");
                Err(err)
            }
        }
    }
}
