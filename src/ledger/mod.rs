pub mod store;

pub use store::{LedgerError, LedgerStore, PostgresLedgerStore};
