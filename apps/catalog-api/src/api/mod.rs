//! API routes module
//!
//! Wires the domain routers to HTTP routes and decides which of them sit
//! behind the current-user middleware.

pub mod health;
pub mod items;
pub mod users;

use axum::Router;
use domain_users::{AuthState, MongoUserRepository, UserService};

use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    let auth_state = auth_state(state);

    Router::new()
        .merge(domain_users::auth::router(auth_state.clone()))
        .nest("/users", users::router(state, auth_state.clone()))
        .nest("/items", items::router(state, auth_state))
        .merge(health::router(state.clone()))
}

/// Build the state shared by the login routes and the auth middleware
fn auth_state(state: &AppState) -> AuthState<MongoUserRepository> {
    AuthState {
        service: UserService::new(MongoUserRepository::new(state.db.clone())),
        jwt: state.jwt.clone(),
        jwt_config: state.config.jwt.clone(),
        mailer: state.mailer.clone(),
    }
}
