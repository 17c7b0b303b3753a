//! Application state management.
//!
//! The shared state passed to all request handlers: configuration, the
//! MongoDB client, the JWT signer and the (optional) mailer.

use axum_helpers::JwtAuth;
use email::Mailer;
use mongodb::{Client, Database};

/// Shared application state.
///
/// Cloned for each handler (inexpensive Arc clones under the hood).
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    /// MongoDB database instance
    pub db: Database,
    /// Stateless JWT signer/verifier
    pub jwt: JwtAuth,
    /// None when SMTP is not configured; email features are disabled
    pub mailer: Option<Mailer>,
}
