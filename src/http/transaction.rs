use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::broker::Producer;
use crate::audit::AuditRepository;
use crate::http::routes::AppState;
use crate::http::error::ApiError;
use crate::model::{Transaction, TransactionType};
use crate::transaction::CreateTransactionRequest;

#[derive(Debug, Serialize)]
pub struct PendingTransactionResponse {
    #[serde(flatten)]
    pub transaction: Transaction,
}

pub async fn deposit<P: Producer, A: AuditRepository>(
    State(state): State<AppState<P, A>>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<PendingTransactionResponse>), ApiError> {
    validate_amount(request.amount)?;
    let account_id = request.account_id;
    let txn = state
        .transactions
        .create_transaction(account_id, TransactionType::Deposit, request)
        .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(PendingTransactionResponse { transaction: txn }),
    ))
}

pub async fn withdraw<P: Producer, A: AuditRepository>(
    State(state): State<AppState<P, A>>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<PendingTransactionResponse>), ApiError> {
    validate_amount(request.amount)?;
    let account_id = request.account_id;
    let txn = state
        .transactions
        .create_transaction(account_id, TransactionType::Withdrawal, request)
        .await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(PendingTransactionResponse { transaction: txn }),
    ))
}

pub async fn audit<P: Producer, A: AuditRepository>(
    State(state): State<AppState<P, A>>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let txns = state.transactions.get_transactions(account_id).await?;
    Ok(Json(txns))
}

fn validate_amount(amount: rust_decimal::Decimal) -> Result<(), ApiError> {
    if amount <= rust_decimal::Decimal::ZERO {
        return Err(ApiError::validation("amount must be positive"));
    }
    Ok(())
}
