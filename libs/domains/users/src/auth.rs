//! Login, password recovery and current-user middleware.
//!
//! The middleware verifies the bearer token, loads the account from the
//! repository and injects a [`CurrentUser`] into request extensions. Routes
//! behind it can rely on the extension being present.

use axum::{
    Extension, Form, Json, Router,
    extract::{Path, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::post,
};
use axum_helpers::{
    CurrentUser, JwtAuth, JwtConfig, Message, ValidatedJson, extract_bearer_token,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
};
use email::Mailer;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{LoginForm, NewPassword, TokenResponse, UserPublic};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Shared state for login routes and the auth middleware
pub struct AuthState<R: UserRepository> {
    pub service: UserService<R>,
    pub jwt: JwtAuth,
    pub jwt_config: JwtConfig,
    pub mailer: Option<Mailer>,
}

impl<R: UserRepository> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            jwt: self.jwt.clone(),
            jwt_config: self.jwt_config.clone(),
            mailer: self.mailer.clone(),
        }
    }
}

/// OpenAPI documentation for login and password recovery
#[derive(OpenApi)]
#[openapi(
    paths(login_access_token, test_token, recover_password, reset_password),
    components(
        schemas(LoginForm, TokenResponse, NewPassword, UserPublic, Message),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Login", description = "Authentication and password recovery")
    )
)]
pub struct ApiDoc;

/// Create the login/recovery router
///
/// Only `/login/test-token` sits behind the auth middleware; the other
/// routes are reachable without credentials.
pub fn router<R: UserRepository + 'static>(state: AuthState<R>) -> Router {
    let protected = Router::new()
        .route("/login/test-token", post(test_token))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user::<R>,
        ))
        .with_state(state.clone());

    Router::new()
        .route("/login/access-token", post(login_access_token))
        .route("/password-recovery/{email}", post(recover_password))
        .route("/reset-password", post(reset_password))
        .with_state(state)
        .merge(protected)
}

/// Middleware resolving the current user from the bearer token
///
/// Rejects missing/invalid tokens (401), deleted accounts (404) and
/// inactive accounts (400), then inserts [`CurrentUser`] into extensions.
pub async fn require_user<R: UserRepository>(
    State(state): State<AuthState<R>>,
    mut request: Request,
    next: Next,
) -> Result<Response, UserError> {
    let token = extract_bearer_token(request.headers()).ok_or(UserError::Unauthorized)?;

    let user_id = state
        .jwt
        .verify_access_token(token)
        .map_err(|_| UserError::Unauthorized)?;

    let user = state.service.get_user(user_id).await?;

    if !user.is_active {
        return Err(UserError::InactiveUser);
    }

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        is_active: user.is_active,
        is_superuser: user.is_superuser,
    });

    Ok(next.run(request).await)
}

/// OAuth2-compatible password login
#[utoipa::path(
    post,
    path = "/login/access-token",
    tag = "Login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login_access_token<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Form(form): Form<LoginForm>,
) -> UserResult<Json<TokenResponse>> {
    let user = state.service.authenticate(&form.username, &form.password).await?;

    let access_token = state
        .jwt
        .create_access_token(user.id, state.jwt_config.access_ttl())
        .map_err(|e| UserError::Internal(format!("Failed to create token: {e}")))?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        id: user.id,
        full_name: user.full_name,
        email: user.email,
    }))
}

/// Return the caller's profile, proving the token works
#[utoipa::path(
    post,
    path = "/login/test-token",
    tag = "Login",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token is valid", body = UserPublic),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn test_token<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Extension(user): Extension<CurrentUser>,
) -> UserResult<Json<UserPublic>> {
    let user = state.service.get_user(user.id).await?;
    Ok(Json(UserPublic::from(user)))
}

/// Start password recovery for the given email
#[utoipa::path(
    post,
    path = "/password-recovery/{email}",
    tag = "Login",
    params(
        ("email" = String, Path, description = "Account email address")
    ),
    responses(
        (status = 200, description = "Recovery email sent", body = Message),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn recover_password<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Path(email): Path<String>,
) -> UserResult<Json<Message>> {
    let user = state
        .service
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| UserError::EmailNotFound(email.clone()))?;

    let token = state
        .jwt
        .create_reset_token(&user.email, state.jwt_config.reset_ttl())
        .map_err(|e| UserError::Internal(format!("Failed to create token: {e}")))?;

    // Dispatch off the response path; a delivery failure is logged, never
    // surfaced to the caller.
    if let Some(mailer) = state.mailer.clone() {
        let to_email = user.email.clone();
        let valid_hours = state.jwt_config.email_reset_token_expire_hours;
        tokio::spawn(async move {
            if let Err(e) = mailer
                .send_reset_password_email(&to_email, &token, valid_hours)
                .await
            {
                tracing::error!(email = %to_email, error = %e, "Failed to send password recovery email");
            }
        });
    } else {
        tracing::warn!(email = %user.email, "SMTP not configured, skipping password recovery email");
    }

    Ok(Json(Message::new("Password recovery email sent")))
}

/// Complete password recovery with a reset token
#[utoipa::path(
    post,
    path = "/reset-password",
    tag = "Login",
    request_body = NewPassword,
    responses(
        (status = 200, description = "Password updated", body = Message),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn reset_password<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<NewPassword>,
) -> UserResult<Json<Message>> {
    let email = state
        .jwt
        .verify_reset_token(&input.token)
        .map_err(|_| UserError::InvalidToken)?;

    state.service.reset_password(&email, &input.new_password).await?;

    Ok(Json(Message::new("Password updated successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserCreate;
    use crate::repository::InMemoryUserRepository;
    use email::{MailerConfig, MockSmtpProvider};
    use std::sync::Arc;
    use std::time::Duration;

    fn test_state(mailer: Option<Mailer>) -> AuthState<InMemoryUserRepository> {
        let jwt_config = JwtConfig::new("test-secret-key-with-at-least-32-chars");
        AuthState {
            service: UserService::new(InMemoryUserRepository::new()),
            jwt: JwtAuth::new(&jwt_config),
            jwt_config,
            mailer,
        }
    }

    /// Pull the reset token out of the `token=` query parameter in the
    /// emailed link.
    fn token_from_body(body: &str) -> &str {
        let start = body.find("token=").expect("reset link in email body") + "token=".len();
        let rest = &body[start..];
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        &rest[..end]
    }

    #[tokio::test]
    async fn test_password_recovery_round_trip() {
        let provider = Arc::new(MockSmtpProvider::new());
        let mailer = Mailer::new(
            provider.clone(),
            MailerConfig {
                project_name: "Catalog".to_string(),
                frontend_url: "http://localhost:5173".to_string(),
            },
        )
        .unwrap();
        let state = test_state(Some(mailer));

        state
            .service
            .create_user(UserCreate {
                email: "forgetful@example.com".to_string(),
                password: "old-password-1".to_string(),
                full_name: None,
                is_active: true,
                is_superuser: false,
            })
            .await
            .unwrap();

        recover_password(
            State(state.clone()),
            Path("forgetful@example.com".to_string()),
        )
        .await
        .unwrap();

        // Delivery runs in a spawned task, so give it a moment
        let mut sent = provider.sent_emails().await;
        for _ in 0..100 {
            if !sent.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            sent = provider.sent_emails().await;
        }
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "forgetful@example.com");

        let body = sent[0]
            .body_html
            .as_deref()
            .or(sent[0].body_text.as_deref())
            .unwrap();
        let token = token_from_body(body).to_string();

        reset_password(
            State(state.clone()),
            ValidatedJson(NewPassword {
                token,
                new_password: "brand-new-pass-1".to_string(),
            }),
        )
        .await
        .unwrap();

        let old = state
            .service
            .authenticate("forgetful@example.com", "old-password-1")
            .await;
        assert!(matches!(old, Err(UserError::InvalidCredentials)));

        let user = state
            .service
            .authenticate("forgetful@example.com", "brand-new-pass-1")
            .await
            .unwrap();
        assert_eq!(user.email, "forgetful@example.com");
    }

    #[tokio::test]
    async fn test_reset_password_rejects_garbage_token() {
        let state = test_state(None);

        let result = reset_password(
            State(state),
            ValidatedJson(NewPassword {
                token: "not-a-jwt".to_string(),
                new_password: "brand-new-pass-1".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(UserError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_recover_password_unknown_email() {
        let state = test_state(None);

        let result = recover_password(
            State(state),
            Path("nobody@example.com".to_string()),
        )
        .await;

        assert!(matches!(result, Err(UserError::EmailNotFound(_))));
    }
}
