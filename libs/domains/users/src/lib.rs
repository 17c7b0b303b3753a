//! Users Domain
//!
//! User accounts, password login with JWT issuance, password recovery over
//! email, and superuser-gated administration, all backed by MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  Handlers / Auth     │  ← HTTP endpoints + current-user middleware
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │       Service        │  ← Hashing, credentials, uniqueness
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │      Repository      │  ← Data access (trait + MongoDB implementation)
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │        Models        │  ← Entities, DTOs
//! └──────────────────────┘
//! ```
//!
//! Routes split into three routers so the binary can decide what sits
//! behind the auth middleware: [`auth::router`] (login + recovery, mostly
//! public), [`handlers::signup_router`] (public) and [`handlers::router`]
//! (authenticated user management).

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use auth::{AuthState, require_user};
pub use error::{UserError, UserResult};
pub use handlers::{ApiDoc, UsersState};
pub use models::{
    NewPassword, TokenResponse, UpdatePassword, User, UserCreate, UserFilter, UserPublic,
    UserRegister, UserUpdate, UserUpdateMe, UsersPublic,
};
pub use mongodb::MongoUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::{UserService, hash_password, verify_password};
