use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::account::AccountService;
use crate::audit::AuditRepository;
use crate::broker::Producer;
use crate::http::{account, transaction};
use crate::transaction::TransactionService;

pub struct AppState<P: Producer, A: AuditRepository> {
    pub account: Arc<AccountService>,
    pub transactions: Arc<TransactionService<P, A>>,
}

impl<P: Producer, A: AuditRepository> Clone for AppState<P, A> {
    fn clone(&self) -> Self {
        Self {
            account: self.account.clone(),
            transactions: self.transactions.clone(),
        }
    }
}

impl<P: Producer, A: AuditRepository> FromRef<AppState<P, A>> for Arc<AccountService> {
    fn from_ref(state: &AppState<P, A>) -> Self {
        state.account.clone()
    }
}

/// Wires the four documented endpoints onto one router. Transport concerns
/// end here; everything below is service-layer validation and enqueue/audit
/// logic.
pub fn router<P: Producer + 'static, A: AuditRepository + 'static>(
    state: AppState<P, A>,
) -> Router {
    Router::new()
        .route("/accounts", post(account::create_account))
        .route("/accounts/deposit", post(transaction::deposit::<P, A>))
        .route("/accounts/withdraw", post(transaction::withdraw::<P, A>))
        .route("/accounts/:id/transactions", get(transaction::audit::<P, A>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
