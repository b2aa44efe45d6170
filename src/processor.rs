use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::audit::AuditRepository;
use crate::broker::DeadLetterWriter;
use crate::ledger::LedgerStore;
use crate::model::{Transaction, TransactionStatus};

const MAX_RETRIES: u32 = 3;
const PER_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, payload: Vec<u8>);
}

enum AttemptOutcome {
    Completed,
    Permanent(String),
    Retryable(String),
}

/// Per-message lifecycle: decode, apply with bounded retries, classify the
/// result, route to the dead-letter topic if retries are exhausted, and
/// always try to record the terminal outcome in the audit log.
pub struct TransactionProcessor<L: LedgerStore, D: DeadLetterWriter, A: AuditRepository> {
    ledger: Arc<L>,
    dlq: Arc<D>,
    audit: Arc<A>,
}

impl<L: LedgerStore, D: DeadLetterWriter, A: AuditRepository> TransactionProcessor<L, D, A> {
    pub fn new(ledger: Arc<L>, dlq: Arc<D>, audit: Arc<A>) -> Self {
        Self { ledger, dlq, audit }
    }

    async fn attempt(&self, txn: &Transaction) -> AttemptOutcome {
        match tokio::time::timeout(PER_ATTEMPT_TIMEOUT, self.ledger.apply_transaction(txn)).await {
            Ok(Ok(())) => AttemptOutcome::Completed,
            Ok(Err(err)) if err.is_permanent() => AttemptOutcome::Permanent(err.to_string()),
            Ok(Err(err)) => AttemptOutcome::Retryable(err.to_string()),
            Err(_) => AttemptOutcome::Retryable("apply attempt timed out after 30s".to_string()),
        }
    }

    /// Runs the retry/route state machine for one already-decoded
    /// transaction. Exposed separately from [`MessageHandler::handle`] so
    /// tests can exercise it without going through JSON decoding.
    pub async fn process(&self, mut txn: Transaction) {
        let mut last_error: Option<String> = None;

        for attempt in 1..=MAX_RETRIES {
            match self.attempt(&txn).await {
                AttemptOutcome::Completed => {
                    txn.status = TransactionStatus::Completed;
                    last_error = None;
                    break;
                }
                AttemptOutcome::Permanent(message) => {
                    warn!(
                        id = %txn.id,
                        error = %message,
                        "permanent transaction failure, skipping retry"
                    );
                    txn.status = TransactionStatus::Failed;
                    last_error = None;
                    break;
                }
                AttemptOutcome::Retryable(message) => {
                    warn!(id = %txn.id, attempt, error = %message, "retryable transaction failure");
                    last_error = Some(message);
                    sleep(Duration::from_secs(attempt as u64)).await;
                }
            }
        }

        if let Some(message) = &last_error {
            if txn.status != TransactionStatus::Completed {
                txn.status = TransactionStatus::Failed;
                match self.dlq.write(&txn, message).await {
                    Ok(()) => info!(id = %txn.id, "message sent to DLT"),
                    Err(err) => error!(id = %txn.id, error = %err, "failed to write to DLT"),
                }
            }
        }

        info!(id = %txn.id, status = %txn.status, amount = %txn.amount, "transaction processed");

        if let Err(err) = self.audit.save(&txn).await {
            error!(id = %txn.id, error = %err, "audit failed (non-critical)");
        }
    }
}

#[async_trait]
impl<L: LedgerStore, D: DeadLetterWriter, A: AuditRepository> MessageHandler
    for TransactionProcessor<L, D, A>
{
    async fn handle(&self, payload: Vec<u8>) {
        let txn: Transaction = match serde_json::from_slice(&payload) {
            Ok(txn) => txn,
            Err(err) => {
                error!(error = %err, "invalid transaction format, discarding message");
                return;
            }
        };
        self.process(txn).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditError;
    use crate::broker::BrokerError;
    use crate::ledger::LedgerError;
    use crate::model::{TransactionType};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct ScriptedLedger {
        results: Mutex<Vec<Result<(), LedgerError>>>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl LedgerStore for ScriptedLedger {
        async fn apply_transaction(&self, _txn: &Transaction) -> Result<(), LedgerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                return Ok(());
            }
            results.remove(0)
        }

        async fn get_account(&self, _account_id: Uuid) -> Result<crate::model::Account, LedgerError> {
            unimplemented!("not exercised by processor tests")
        }

        async fn get_account_balance(&self, _account_id: Uuid) -> Result<rust_decimal::Decimal, LedgerError> {
            unimplemented!("not exercised by processor tests")
        }
    }

    struct RecordingDlq {
        writes: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl DeadLetterWriter for RecordingDlq {
        async fn write(&self, txn: &Transaction, _error: &str) -> Result<(), BrokerError> {
            self.writes.lock().unwrap().push(txn.id);
            Ok(())
        }
    }

    struct RecordingAudit {
        saved: Mutex<Vec<TransactionStatus>>,
    }

    #[async_trait]
    impl AuditRepository for RecordingAudit {
        async fn save(&self, txn: &Transaction) -> Result<(), AuditError> {
            self.saved.lock().unwrap().push(txn.status);
            Ok(())
        }

        async fn find_by_account(&self, _account_id: Uuid) -> Result<Vec<Transaction>, AuditError> {
            Ok(Vec::new())
        }
    }

    fn sample_txn() -> Transaction {
        Transaction::new(Uuid::new_v4(), TransactionType::Deposit, dec!(10.00), "USD", Uuid::new_v4())
    }

    #[tokio::test]
    async fn success_on_first_attempt_skips_dlq_and_audits_completed() {
        let ledger = Arc::new(ScriptedLedger {
            results: Mutex::new(vec![]),
            calls: AtomicU32::new(0),
        });
        let dlq = Arc::new(RecordingDlq { writes: Mutex::new(Vec::new()) });
        let audit = Arc::new(RecordingAudit { saved: Mutex::new(Vec::new()) });
        let processor = TransactionProcessor::new(ledger.clone(), dlq.clone(), audit.clone());

        processor.process(sample_txn()).await;

        assert_eq!(ledger.calls.load(Ordering::SeqCst), 1);
        assert!(dlq.writes.lock().unwrap().is_empty());
        assert_eq!(audit.saved.lock().unwrap().as_slice(), [TransactionStatus::Completed]);
    }

    #[tokio::test]
    async fn permanent_failure_does_not_retry_or_dlq() {
        let ledger = Arc::new(ScriptedLedger {
            results: Mutex::new(vec![Err(LedgerError::InsufficientFunds)]),
            calls: AtomicU32::new(0),
        });
        let dlq = Arc::new(RecordingDlq { writes: Mutex::new(Vec::new()) });
        let audit = Arc::new(RecordingAudit { saved: Mutex::new(Vec::new()) });
        let processor = TransactionProcessor::new(ledger.clone(), dlq.clone(), audit.clone());

        processor.process(sample_txn()).await;

        assert_eq!(ledger.calls.load(Ordering::SeqCst), 1);
        assert!(dlq.writes.lock().unwrap().is_empty());
        assert_eq!(audit.saved.lock().unwrap().as_slice(), [TransactionStatus::Failed]);
    }

    #[tokio::test]
    async fn retryable_failure_exhausts_retries_then_dlqs() {
        let ledger = Arc::new(ScriptedLedger {
            results: Mutex::new(vec![
                Err(LedgerError::Database(sqlx::Error::PoolClosed)),
                Err(LedgerError::Database(sqlx::Error::PoolClosed)),
                Err(LedgerError::Database(sqlx::Error::PoolClosed)),
            ]),
            calls: AtomicU32::new(0),
        });
        let dlq = Arc::new(RecordingDlq { writes: Mutex::new(Vec::new()) });
        let audit = Arc::new(RecordingAudit { saved: Mutex::new(Vec::new()) });
        let processor = TransactionProcessor::new(ledger.clone(), dlq.clone(), audit.clone());

        processor.process(sample_txn()).await;

        assert_eq!(ledger.calls.load(Ordering::SeqCst), 3);
        assert_eq!(dlq.writes.lock().unwrap().len(), 1);
        assert_eq!(audit.saved.lock().unwrap().as_slice(), [TransactionStatus::Failed]);
    }

    #[tokio::test]
    async fn retryable_failure_then_success_skips_dlq() {
        let ledger = Arc::new(ScriptedLedger {
            results: Mutex::new(vec![Err(LedgerError::Database(sqlx::Error::PoolClosed)), Ok(())]),
            calls: AtomicU32::new(0),
        });
        let dlq = Arc::new(RecordingDlq { writes: Mutex::new(Vec::new()) });
        let audit = Arc::new(RecordingAudit { saved: Mutex::new(Vec::new()) });
        let processor = TransactionProcessor::new(ledger.clone(), dlq.clone(), audit.clone());

        processor.process(sample_txn()).await;

        assert_eq!(ledger.calls.load(Ordering::SeqCst), 2);
        assert!(dlq.writes.lock().unwrap().is_empty());
        assert_eq!(audit.saved.lock().unwrap().as_slice(), [TransactionStatus::Completed]);
    }

    #[tokio::test]
    async fn malformed_payload_is_discarded_without_audit_or_dlq() {
        let ledger = Arc::new(ScriptedLedger { results: Mutex::new(vec![]), calls: AtomicU32::new(0) });
        let dlq = Arc::new(RecordingDlq { writes: Mutex::new(Vec::new()) });
        let audit = Arc::new(RecordingAudit { saved: Mutex::new(Vec::new()) });
        let processor = TransactionProcessor::new(ledger.clone(), dlq.clone(), audit.clone());

        processor.handle(b"not json".to_vec()).await;

        assert_eq!(ledger.calls.load(Ordering::SeqCst), 0);
        assert!(dlq.writes.lock().unwrap().is_empty());
        assert!(audit.saved.lock().unwrap().is_empty());
    }
}
