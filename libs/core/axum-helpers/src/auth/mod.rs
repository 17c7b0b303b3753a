//! Authentication and authorization module.
//!
//! This module provides:
//! - JWT token creation and verification (access and password-reset tokens)
//! - The [`CurrentUser`] type inserted into request extensions by auth middleware
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig};
//! use core_config::FromEnv;
//!
//! let config = JwtConfig::from_env()?;
//! let auth = JwtAuth::new(&config);
//!
//! let token = auth.create_access_token(user_id, config.access_ttl())?;
//! let user_id = auth.verify_access_token(&token)?;
//! ```

pub mod config;
pub mod jwt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Re-export commonly used types
pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims, TokenPurpose, extract_bearer_token};

/// Authenticated user resolved from an access token.
///
/// Auth middleware verifies the bearer token, loads the account, and
/// inserts this into request extensions. Handlers receive it through
/// `Extension<CurrentUser>`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
}
