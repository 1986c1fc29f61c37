use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::client::ClientError;
use crate::models::PeriodKind;

/// Failures of the backing goal store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Corrupt entry for {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Rejected goal input. Never reaches the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("goal value must be a finite number, got {0}")]
    NonFinite(f64),

    #[error("goal value cannot be negative, got {0}")]
    Negative(f64),

    #[error("goal value must be greater than zero, got {0}")]
    NonPositive(f64),

    #[error("period index {index} is out of range for {kind} goals")]
    IndexOutOfRange { kind: PeriodKind, index: u32 },
}

#[derive(Debug, Error)]
pub enum GoalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Goal error: {0}")]
    Goal(#[from] GoalError),

    #[error("Metrics API error: {0}")]
    Client(#[from] ClientError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Goal(GoalError::Validation(ref e)) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Goal(GoalError::Storage(ref e)) => {
                tracing::error!("Goal storage error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Goal could not be saved, please retry".to_string(),
                )
            }
            AppError::Client(ref e) => {
                tracing::warn!("Metrics API error: {}", e);
                (StatusCode::BAD_GATEWAY, "Metrics API unavailable".to_string())
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidInput(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
