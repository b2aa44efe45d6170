pub mod service;
pub mod store;

pub use service::{AccountResponse, AccountService, CreateAccountRequest};
pub use store::{AccountError, AccountStore, PostgresAccountStore};
