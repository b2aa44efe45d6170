pub mod service;

pub use service::{CreateTransactionRequest, TransactionService, TransactionServiceError};
