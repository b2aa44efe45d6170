pub mod account;
pub mod audit;
pub mod broker;
pub mod config;
pub mod http;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod processor;
pub mod transaction;

pub use account::{AccountError, AccountService, AccountStore, PostgresAccountStore};
pub use audit::{AuditError, AuditRepository, MongoAuditRepository};
pub use broker::{BrokerConsumer, BrokerError, DeadLetterWriter, KafkaDeadLetterWriter, KafkaProducer, Producer};
pub use config::{Config, ConfigError};
pub use ledger::{LedgerError, LedgerStore, PostgresLedgerStore};
pub use model::{Account, AccountStatus, Transaction, TransactionStatus, TransactionType};
pub use processor::{MessageHandler, TransactionProcessor};
pub use transaction::{CreateTransactionRequest, TransactionService, TransactionServiceError};
