use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AccountError, OrderError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ValidationError(String),

    Unauthorized(String),

    /// Authenticated but not allowed (admin-only surface).
    Forbidden(String),

    Conflict(String),

    /// Verification code past its expiry window.
    Expired(String),

    AlreadyVerified(String),

    /// A collaborator (mail dispatch) failed.
    DependencyFailure(String),

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Expired(msg) => write!(f, "Expired: {}", msg),
            ApiError::AlreadyVerified(msg) => write!(f, "Already verified: {}", msg),
            ApiError::DependencyFailure(msg) => write!(f, "Dependency failure: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::Conflict(msg) | ApiError::AlreadyVerified(msg) => {
                (StatusCode::CONFLICT, msg.clone())
            }
            ApiError::Expired(msg) => (StatusCode::GONE, msg.clone()),
            ApiError::DependencyFailure(msg) => {
                tracing::warn!("Dependency failure: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        let msg = err.to_string();
        match err {
            AccountError::EmailTaken => ApiError::Conflict(msg),
            AccountError::InvalidCredentials => ApiError::Unauthorized(msg),
            AccountError::UserNotFound => ApiError::NotFound(msg),
            AccountError::AlreadyVerified => ApiError::AlreadyVerified(msg),
            AccountError::CodeExpired => ApiError::Expired(msg),
            AccountError::InvalidCode | AccountError::Validation(_) => {
                ApiError::ValidationError(msg)
            }
            AccountError::MailDispatch(_) => ApiError::DependencyFailure(msg),
            AccountError::Database(_) => ApiError::DatabaseError(msg),
            AccountError::Internal(_) => ApiError::InternalError(msg),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let msg = err.to_string();
        match err {
            OrderError::EmptyOrder | OrderError::InvalidQuantity => ApiError::ValidationError(msg),
            OrderError::DishNotFound(_) | OrderError::OrderNotFound => ApiError::NotFound(msg),
            OrderError::Database(_) => ApiError::DatabaseError(msg),
            OrderError::Internal(_) => ApiError::InternalError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::InternalError(msg.into())
    }
}
