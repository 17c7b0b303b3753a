use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_helpers::{
    CurrentUser, Message, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use domain_items::{ItemService, repository::ItemRepository};
use email::Mailer;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{
    UpdatePassword, UserCreate, UserFilter, UserPublic, UserRegister, UserUpdate, UserUpdateMe,
    UsersPublic,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        create_user,
        signup,
        read_me,
        update_me,
        delete_me,
        update_password_me,
        read_user,
        update_user,
        delete_user,
    ),
    components(
        schemas(
            UserPublic,
            UsersPublic,
            UserCreate,
            UserRegister,
            UserUpdate,
            UserUpdateMe,
            UpdatePassword,
            Message
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "User management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Shared state for the users routes
///
/// Carries the item service so user deletion can cascade to owned items.
pub struct UsersState<R: UserRepository, I: ItemRepository> {
    pub service: UserService<R>,
    pub items: ItemService<I>,
    pub mailer: Option<Mailer>,
}

impl<R: UserRepository, I: ItemRepository> Clone for UsersState<R, I> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            items: self.items.clone(),
            mailer: self.mailer.clone(),
        }
    }
}

/// Create the users router (everything here expects an authenticated caller)
pub fn router<R: UserRepository + 'static, I: ItemRepository + 'static>(
    state: UsersState<R, I>,
) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/me", get(read_me).patch(update_me).delete(delete_me))
        .route("/me/password", patch(update_password_me))
        .route(
            "/{id}",
            get(read_user).patch(update_user).delete(delete_user),
        )
        .with_state(Arc::new(state))
}

/// Create the public signup router
pub fn signup_router<R: UserRepository + 'static, I: ItemRepository + 'static>(
    state: UsersState<R, I>,
) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .with_state(Arc::new(state))
}

fn ensure_superuser(user: &CurrentUser) -> UserResult<()> {
    if user.is_superuser {
        Ok(())
    } else {
        Err(UserError::Forbidden(
            "The user doesn't have enough privileges".to_string(),
        ))
    }
}

/// Best-effort item cascade; failures are logged, never rolled back
async fn cascade_delete_items<I: ItemRepository>(items: &ItemService<I>, owner_id: Uuid) {
    if let Err(e) = items.delete_all_for_owner(owner_id).await {
        tracing::error!(%owner_id, error = %e, "Failed to delete items for removed user");
    }
}

/// List users (superuser only)
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    params(UserFilter),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paginated list of users", body = UsersPublic),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository, I: ItemRepository>(
    State(state): State<Arc<UsersState<R, I>>>,
    Extension(current): Extension<CurrentUser>,
    Query(filter): Query<UserFilter>,
) -> UserResult<Json<UsersPublic>> {
    ensure_superuser(&current)?;

    let (users, count) = state.service.list_users(filter).await?;
    Ok(Json(UsersPublic {
        data: users.into_iter().map(UserPublic::from).collect(),
        count,
    }))
}

/// Create a user (superuser only)
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = UserCreate,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "User created successfully", body = UserPublic),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository, I: ItemRepository>(
    State(state): State<Arc<UsersState<R, I>>>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(input): ValidatedJson<UserCreate>,
) -> UserResult<impl IntoResponse> {
    ensure_superuser(&current)?;

    let user = state.service.create_user(input).await?;

    if let Some(mailer) = state.mailer.clone() {
        let to_email = user.email.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_new_account_email(&to_email, &to_email).await {
                tracing::error!(email = %to_email, error = %e, "Failed to send new account email");
            }
        });
    }

    Ok((StatusCode::CREATED, Json(UserPublic::from(user))))
}

/// Open registration
#[utoipa::path(
    post,
    path = "/signup",
    tag = "Users",
    request_body = UserRegister,
    responses(
        (status = 201, description = "Account created", body = UserPublic),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn signup<R: UserRepository, I: ItemRepository>(
    State(state): State<Arc<UsersState<R, I>>>,
    ValidatedJson(input): ValidatedJson<UserRegister>,
) -> UserResult<impl IntoResponse> {
    let user = state.service.register_user(input).await?;
    Ok((StatusCode::CREATED, Json(UserPublic::from(user))))
}

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserPublic),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn read_me<R: UserRepository, I: ItemRepository>(
    State(state): State<Arc<UsersState<R, I>>>,
    Extension(current): Extension<CurrentUser>,
) -> UserResult<Json<UserPublic>> {
    let user = state.service.get_user(current.id).await?;
    Ok(Json(UserPublic::from(user)))
}

/// Update the current user's profile
#[utoipa::path(
    patch,
    path = "/me",
    tag = "Users",
    request_body = UserUpdateMe,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile updated", body = UserPublic),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_me<R: UserRepository, I: ItemRepository>(
    State(state): State<Arc<UsersState<R, I>>>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(input): ValidatedJson<UserUpdateMe>,
) -> UserResult<Json<UserPublic>> {
    let user = state.service.update_me(current.id, input).await?;
    Ok(Json(UserPublic::from(user)))
}

/// Delete the current user's account
///
/// Superusers cannot delete themselves. Owned items are removed best-effort.
#[utoipa::path(
    delete,
    path = "/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account deleted", body = Message),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_me<R: UserRepository, I: ItemRepository>(
    State(state): State<Arc<UsersState<R, I>>>,
    Extension(current): Extension<CurrentUser>,
) -> UserResult<Json<Message>> {
    if current.is_superuser {
        return Err(UserError::Forbidden(
            "Super users are not allowed to delete themselves".to_string(),
        ));
    }

    cascade_delete_items(&state.items, current.id).await;
    state.service.delete_user(current.id).await?;

    Ok(Json(Message::new("User deleted successfully")))
}

/// Change the current user's password
#[utoipa::path(
    patch,
    path = "/me/password",
    tag = "Users",
    request_body = UpdatePassword,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Password updated", body = Message),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_password_me<R: UserRepository, I: ItemRepository>(
    State(state): State<Arc<UsersState<R, I>>>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(input): ValidatedJson<UpdatePassword>,
) -> UserResult<Json<Message>> {
    state.service.update_password(current.id, input).await?;
    Ok(Json(Message::new("Password updated successfully")))
}

/// Get a user by ID (superuser only)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User found", body = UserPublic),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn read_user<R: UserRepository, I: ItemRepository>(
    State(state): State<Arc<UsersState<R, I>>>,
    Extension(current): Extension<CurrentUser>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserPublic>> {
    ensure_superuser(&current)?;

    let user = state.service.get_user(id).await?;
    Ok(Json(UserPublic::from(user)))
}

/// Update a user (superuser only)
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UserUpdate,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User updated", body = UserPublic),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository, I: ItemRepository>(
    State(state): State<Arc<UsersState<R, I>>>,
    Extension(current): Extension<CurrentUser>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UserUpdate>,
) -> UserResult<Json<UserPublic>> {
    ensure_superuser(&current)?;

    let user = state.service.update_user(id, input).await?;
    Ok(Json(UserPublic::from(user)))
}

/// Delete a user (superuser only, cascades to owned items)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User deleted", body = Message),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository, I: ItemRepository>(
    State(state): State<Arc<UsersState<R, I>>>,
    Extension(current): Extension<CurrentUser>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<Message>> {
    ensure_superuser(&current)?;

    if id == current.id {
        return Err(UserError::Forbidden(
            "Super users are not allowed to delete themselves".to_string(),
        ));
    }

    // 404 before touching any items
    state.service.get_user(id).await?;

    cascade_delete_items(&state.items, id).await;
    state.service.delete_user(id).await?;

    Ok(Json(Message::new("User deleted successfully")))
}
