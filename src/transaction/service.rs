use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::audit::{AuditError, AuditRepository};
use crate::broker::{BrokerError, Producer};
use crate::model::{Transaction, TransactionType, TransactionValidationError};

#[derive(Debug, Error)]
pub enum TransactionServiceError {
    #[error("reference_id must be a valid UUID")]
    InvalidReferenceId,
    #[error(transparent)]
    Validation(#[from] TransactionValidationError),
    #[error(transparent)]
    Publish(#[from] BrokerError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub account_id: Uuid,
    pub amount: rust_decimal::Decimal,
    pub currency: String,
    #[serde(default)]
    pub reference_id: Option<String>,
}

/// Enqueues new transactions and serves audit reads. Applying a transaction
/// to the ledger happens out-of-band in the processor; this service only
/// validates, assigns identity, and publishes.
pub struct TransactionService<P: Producer, A: AuditRepository> {
    producer: Arc<P>,
    audit: Arc<A>,
}

impl<P: Producer, A: AuditRepository> TransactionService<P, A> {
    pub fn new(producer: Arc<P>, audit: Arc<A>) -> Self {
        Self { producer, audit }
    }

    pub async fn create_transaction(
        &self,
        account_id: Uuid,
        transaction_type: TransactionType,
        request: CreateTransactionRequest,
    ) -> Result<Transaction, TransactionServiceError> {
        let reference_id = match request.reference_id {
            None => Uuid::new_v4(),
            Some(raw) if raw.is_empty() => Uuid::new_v4(),
            Some(raw) => Uuid::parse_str(&raw).map_err(|_| TransactionServiceError::InvalidReferenceId)?,
        };

        let txn = Transaction::new(
            account_id,
            transaction_type,
            request.amount,
            request.currency.to_uppercase(),
            reference_id,
        );
        txn.validate()?;

        if let Err(err) = self.producer.publish_transaction(&txn).await {
            error!(reference_id = %txn.reference_id, error = %err, "failed to publish transaction");
            return Err(TransactionServiceError::Publish(err));
        }

        info!(
            reference_id = %txn.reference_id,
            amount = %txn.amount,
            currency = %txn.currency,
            "transaction queued successfully"
        );
        Ok(txn)
    }

    pub async fn get_transactions(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<Transaction>, TransactionServiceError> {
        Ok(self.audit.find_by_account(account_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct RecordingProducer {
        published: Mutex<Vec<Transaction>>,
        fail: bool,
    }

    #[async_trait]
    impl Producer for RecordingProducer {
        async fn publish_transaction(&self, txn: &Transaction) -> Result<(), BrokerError> {
            if self.fail {
                return Err(BrokerError::Encode(
                    serde_json::from_str::<()>("not json").unwrap_err(),
                ));
            }
            self.published.lock().unwrap().push(txn.clone());
            Ok(())
        }
    }

    struct EmptyAudit;

    #[async_trait]
    impl AuditRepository for EmptyAudit {
        async fn save(&self, _txn: &Transaction) -> Result<(), AuditError> {
            Ok(())
        }

        async fn find_by_account(&self, _account_id: Uuid) -> Result<Vec<Transaction>, AuditError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn empty_reference_id_is_generated() {
        let service = TransactionService::new(
            Arc::new(RecordingProducer {
                published: Mutex::new(Vec::new()),
                fail: false,
            }),
            Arc::new(EmptyAudit),
        );

        let txn = service
            .create_transaction(
                Uuid::new_v4(),
                TransactionType::Deposit,
                CreateTransactionRequest {
                    account_id: Uuid::new_v4(),
                    amount: dec!(10.00),
                    currency: "usd".to_string(),
                    reference_id: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(txn.currency, "USD");
    }

    #[tokio::test]
    async fn malformed_reference_id_is_rejected() {
        let service = TransactionService::new(
            Arc::new(RecordingProducer {
                published: Mutex::new(Vec::new()),
                fail: false,
            }),
            Arc::new(EmptyAudit),
        );

        let result = service
            .create_transaction(
                Uuid::new_v4(),
                TransactionType::Deposit,
                CreateTransactionRequest {
                    account_id: Uuid::new_v4(),
                    amount: dec!(10.00),
                    currency: "USD".to_string(),
                    reference_id: Some("not-a-uuid".to_string()),
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(TransactionServiceError::InvalidReferenceId)
        ));
    }

    #[tokio::test]
    async fn publish_failure_does_not_panic_and_is_propagated() {
        let service = TransactionService::new(
            Arc::new(RecordingProducer {
                published: Mutex::new(Vec::new()),
                fail: true,
            }),
            Arc::new(EmptyAudit),
        );

        let result = service
            .create_transaction(
                Uuid::new_v4(),
                TransactionType::Deposit,
                CreateTransactionRequest {
                    account_id: Uuid::new_v4(),
                    amount: dec!(10.00),
                    currency: "USD".to_string(),
                    reference_id: None,
                },
            )
            .await;

        assert!(matches!(result, Err(TransactionServiceError::Publish(_))));
    }
}
