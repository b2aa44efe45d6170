use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::account::AccountError;
use crate::transaction::TransactionServiceError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

/// Maps service-level errors onto the coded `{code, message}` envelope and
/// an HTTP status, the same split the original transport layer draws
/// between validation/duplicate errors (4xx) and everything else (5xx).
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Invalid(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_ACCOUNT", err.to_string())
            }
            AccountError::DuplicateAccount => Self::new(
                StatusCode::CONFLICT,
                "DUPLICATE_ACCOUNT_ERROR",
                "account already exists for this user and currency",
            ),
            AccountError::Database(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "Internal server error. Please try again later.",
            ),
        }
    }
}

impl From<TransactionServiceError> for ApiError {
    fn from(err: TransactionServiceError) -> Self {
        match err {
            TransactionServiceError::InvalidReferenceId => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_REFERENCE_ID", err.to_string())
            }
            TransactionServiceError::Validation(_) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }
            TransactionServiceError::Publish(_) | TransactionServiceError::Audit(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "Internal server error. Please try again later.",
            ),
        }
    }
}
