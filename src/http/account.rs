use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::account::{AccountResponse, AccountService, CreateAccountRequest};
use crate::http::error::ApiError;

pub async fn create_account(
    State(service): State<Arc<AccountService>>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    if request.currency.is_empty() {
        return Err(ApiError::validation("currency is required"));
    }
    if request.initial_balance.is_sign_negative() {
        return Err(ApiError::validation("initial_balance must not be negative"));
    }

    let account = service.create_account(request).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}
