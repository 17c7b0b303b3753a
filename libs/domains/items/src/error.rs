use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::{ErrorCode, errors::error_response};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item not found: {0}")]
    NotFound(Uuid),

    #[error("Not enough permissions")]
    Forbidden,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ItemResult<T> = Result<T, ItemError>;

impl IntoResponse for ItemError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ItemError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                format!("Item {} not found", id),
            ),
            // Permission failures on items surface as 400, not 403
            ItemError::Forbidden => (
                StatusCode::BAD_REQUEST,
                ErrorCode::Forbidden,
                "Not enough permissions".to_string(),
            ),
            ItemError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::ValidationError, msg)
            }
            ItemError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    "An internal server error occurred".to_string(),
                )
            }
            ItemError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        error_response(status, message, code)
    }
}

impl From<mongodb::error::Error> for ItemError {
    fn from(err: mongodb::error::Error) -> Self {
        ItemError::Database(err.to_string())
    }
}
