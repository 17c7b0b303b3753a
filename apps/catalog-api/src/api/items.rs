//! Items API routes
//!
//! This module wires up the items domain to HTTP routes, behind the
//! current-user middleware.

use axum::{Router, middleware};
use domain_items::{ItemService, MongoItemRepository, handlers};
use domain_users::{AuthState, MongoUserRepository, require_user};

use crate::state::AppState;

/// Create items router
pub fn router(state: &AppState, auth_state: AuthState<MongoUserRepository>) -> Router {
    // Create the MongoDB repository
    let repository = MongoItemRepository::new(state.db.clone());

    // Create the service
    let service = ItemService::new(repository);

    handlers::router(service).layer(middleware::from_fn_with_state(
        auth_state,
        require_user::<MongoUserRepository>,
    ))
}
