pub mod account;
pub mod transaction;

pub use account::{Account, AccountStatus, AccountValidationError};
pub use transaction::{Transaction, TransactionStatus, TransactionType, TransactionValidationError};
