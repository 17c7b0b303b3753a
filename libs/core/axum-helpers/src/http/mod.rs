//! HTTP middleware module.
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::security_headers;
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers));
//! ```

pub mod security;

// Re-export commonly used functions
pub use security::security_headers;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic message payload returned by endpoints that have no richer body
/// (deletions, password updates, recovery requests).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
