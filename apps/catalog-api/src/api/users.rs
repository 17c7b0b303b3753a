//! Users API routes
//!
//! This module wires up the users domain to HTTP routes. Everything except
//! `/signup` requires an authenticated caller.

use axum::{Router, middleware};
use domain_items::{ItemService, MongoItemRepository};
use domain_users::{AuthState, MongoUserRepository, UsersState, handlers, require_user};

use crate::state::AppState;

/// Create users router
pub fn router(state: &AppState, auth_state: AuthState<MongoUserRepository>) -> Router {
    let users_state = UsersState {
        service: auth_state.service.clone(),
        items: ItemService::new(MongoItemRepository::new(state.db.clone())),
        mailer: state.mailer.clone(),
    };

    handlers::router(users_state.clone())
        .layer(middleware::from_fn_with_state(
            auth_state,
            require_user::<MongoUserRepository>,
        ))
        .merge(handlers::signup_router(users_state))
}
