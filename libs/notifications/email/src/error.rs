//! Error types for the email library.

use thiserror::Error;

/// Result type for email operations.
pub type EmailResult<T> = Result<T, EmailError>;

/// Errors that can occur when building or sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Configuration error (missing or invalid SMTP settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input (bad address, empty body)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Template registration or rendering failed
    #[error("Template error: {0}")]
    Template(String),

    /// Provider error (SMTP transport)
    #[error("Provider error: {0}")]
    Provider(String),
}

impl From<eyre::Report> for EmailError {
    fn from(err: eyre::Report) -> Self {
        Self::Provider(err.to_string())
    }
}
