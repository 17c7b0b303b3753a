use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::{ErrorCode, errors::error_response};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("No user with email '{0}'")]
    EmailNotFound(String),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Email '{0}' is already taken by another user")]
    EmailConflict(String),

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Inactive user")]
    InactiveUser,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            UserError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                format!("User {} not found", id),
            ),
            UserError::EmailNotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                "The user with this email does not exist in the system".to_string(),
            ),
            // Creating over an existing email is a 400; only the update
            // conflict path (EmailConflict) is a 409.
            UserError::DuplicateEmail(_) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::Conflict,
                "The user with this email already exists in the system".to_string(),
            ),
            UserError::EmailConflict(_) => (
                StatusCode::CONFLICT,
                ErrorCode::Conflict,
                "User with this email already exists".to_string(),
            ),
            UserError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidCredentials,
                "Incorrect email or password".to_string(),
            ),
            UserError::InactiveUser => (
                StatusCode::BAD_REQUEST,
                ErrorCode::InactiveUser,
                "Inactive user".to_string(),
            ),
            UserError::InvalidToken => (
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidToken,
                "Invalid token".to_string(),
            ),
            UserError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::ValidationError, msg)
            }
            UserError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::ValidationError, msg)
            }
            UserError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "Not authenticated".to_string(),
            ),
            UserError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden, msg),
            UserError::PasswordHash(msg) => {
                tracing::error!("Password hash error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    "An internal server error occurred".to_string(),
                )
            }
            UserError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    "An internal server error occurred".to_string(),
                )
            }
            UserError::Internal(msg) => {
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

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_credentials_maps_to_400() {
        let response = UserError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_403() {
        let response =
            UserError::Forbidden("The user doesn't have enough privileges".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_duplicate_email_maps_to_400() {
        let response = UserError::DuplicateEmail("a@b.com".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_email_conflict_maps_to_409() {
        let response = UserError::EmailConflict("a@b.com".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let response = UserError::Database("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
