pub mod account;
pub mod error;
pub mod routes;
pub mod transaction;

pub use routes::{router, AppState};
