//! User Service - Business logic layer

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{
    UpdatePassword, User, UserCreate, UserFilter, UserRegister, UserUpdate, UserUpdateMe,
};
use crate::repository::UserRepository;

/// User service providing business logic operations
///
/// Handles password hashing, credential verification, email uniqueness and
/// orchestrates repository operations.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new user with a hashed password
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: UserCreate) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        if self.repository.email_exists(&input.email).await? {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let hashed_password = hash_password(&input.password)?;
        let user = User::new(input, hashed_password);

        self.repository.create(user).await
    }

    /// Open registration: always creates an active, non-superuser account
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register_user(&self, input: UserRegister) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        self.create_user(input.into()).await
    }

    /// Get a user by ID
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Get a user by email (exact match)
    #[instrument(skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> UserResult<Option<User>> {
        self.repository.get_by_email(email).await
    }

    /// List users with the total matching count
    #[instrument(skip(self))]
    pub async fn list_users(&self, filter: UserFilter) -> UserResult<(Vec<User>, u64)> {
        let count = self
            .repository
            .count(UserFilter {
                q: filter.q.clone(),
                ..Default::default()
            })
            .await?;
        let users = self.repository.list(filter).await?;
        Ok((users, count))
    }

    /// Admin update of any user
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: Uuid, input: UserUpdate) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if let Some(ref new_email) = input.email {
            if new_email != &user.email && self.repository.email_exists(new_email).await? {
                return Err(UserError::EmailConflict(new_email.clone()));
            }
        }

        let new_password_hash = match input.password {
            Some(ref password) => Some(hash_password(password)?),
            None => None,
        };

        user.apply_update(input, new_password_hash);
        self.repository.update(user).await
    }

    /// Self-service profile update
    #[instrument(skip(self, input))]
    pub async fn update_me(&self, user_id: Uuid, input: UserUpdateMe) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let mut user = self
            .repository
            .get_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        if let Some(ref new_email) = input.email {
            if new_email != &user.email && self.repository.email_exists(new_email).await? {
                return Err(UserError::EmailConflict(new_email.clone()));
            }
        }

        user.apply_update_me(input);
        self.repository.update(user).await
    }

    /// Change the caller's own password
    ///
    /// Rejects a wrong current password and a new password equal to the
    /// current one.
    #[instrument(skip(self, input))]
    pub async fn update_password(&self, user_id: Uuid, input: UpdatePassword) -> UserResult<()> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let mut user = self
            .repository
            .get_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        if !verify_password(&input.current_password, &user.hashed_password)? {
            return Err(UserError::InvalidCredentials);
        }

        if input.new_password == input.current_password {
            return Err(UserError::InvalidRequest(
                "New password cannot be the same as the current one".to_string(),
            ));
        }

        user.hashed_password = hash_password(&input.new_password)?;
        self.repository.update(user).await?;
        Ok(())
    }

    /// Delete a user by ID
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(UserError::NotFound(id));
        }

        Ok(())
    }

    /// Verify credentials for login
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> UserResult<User> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(password, &user.hashed_password)? {
            return Err(UserError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(UserError::InactiveUser);
        }

        Ok(user)
    }

    /// Set a new password for the account with the given email
    ///
    /// Used by the password-recovery flow after the reset token has been
    /// verified.
    #[instrument(skip(self, new_password))]
    pub async fn reset_password(&self, email: &str, new_password: &str) -> UserResult<()> {
        let mut user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or_else(|| UserError::EmailNotFound(email.to_string()))?;

        if !user.is_active {
            return Err(UserError::InactiveUser);
        }

        user.hashed_password = hash_password(new_password)?;
        self.repository.update(user).await?;
        Ok(())
    }

    /// Ensure a superuser account exists for the given credentials
    ///
    /// Called once at startup. Returns the created user, or None when the
    /// email is already taken.
    #[instrument(skip(self, password))]
    pub async fn ensure_first_superuser(
        &self,
        email: &str,
        password: &str,
    ) -> UserResult<Option<User>> {
        if self.repository.email_exists(email).await? {
            return Ok(None);
        }

        let user = self
            .create_user(UserCreate {
                email: email.to_string(),
                password: password.to_string(),
                full_name: None,
                is_active: true,
                is_superuser: true,
            })
            .await?;

        tracing::info!(user_id = %user.id, "First superuser created");
        Ok(Some(user))
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

/// Hash a password with argon2 and a fresh random salt
pub fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored argon2 hash
pub fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};

    fn create_input(email: &str) -> UserCreate {
        UserCreate {
            email: email.to_string(),
            password: "correct-horse-1".to_string(),
            full_name: Some("Test User".to_string()),
            is_active: true,
            is_superuser: false,
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert_ne!(hash, "hunter2hunter2");
        assert!(verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_hashing_salts_are_random() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let service = UserService::new(InMemoryUserRepository::new());

        let user = service.create_user(create_input("a@example.com")).await.unwrap();
        assert_ne!(user.hashed_password, "correct-horse-1");
        assert!(verify_password("correct-horse-1", &user.hashed_password).unwrap());
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let service = UserService::new(InMemoryUserRepository::new());

        service.create_user(create_input("a@example.com")).await.unwrap();
        let result = service.create_user(create_input("a@example.com")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_register_user_is_never_superuser() {
        let service = UserService::new(InMemoryUserRepository::new());

        let user = service
            .register_user(UserRegister {
                email: "a@example.com".to_string(),
                password: "correct-horse-1".to_string(),
                full_name: None,
            })
            .await
            .unwrap();
        assert!(!user.is_superuser);
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let service = UserService::new(InMemoryUserRepository::new());
        service.create_user(create_input("a@example.com")).await.unwrap();

        let user = service
            .authenticate("a@example.com", "correct-horse-1")
            .await
            .unwrap();
        assert_eq!(user.email, "a@example.com");

        let result = service.authenticate("a@example.com", "wrong").await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));

        let result = service.authenticate("nobody@example.com", "whatever").await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_inactive_user() {
        let service = UserService::new(InMemoryUserRepository::new());

        let mut input = create_input("a@example.com");
        input.is_active = false;
        service.create_user(input).await.unwrap();

        let result = service.authenticate("a@example.com", "correct-horse-1").await;
        assert!(matches!(result, Err(UserError::InactiveUser)));
    }

    #[tokio::test]
    async fn test_update_password_guards() {
        let service = UserService::new(InMemoryUserRepository::new());
        let user = service.create_user(create_input("a@example.com")).await.unwrap();

        // Wrong current password
        let result = service
            .update_password(
                user.id,
                UpdatePassword {
                    current_password: "wrong-password".to_string(),
                    new_password: "brand-new-pass1".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));

        // New password equal to current
        let result = service
            .update_password(
                user.id,
                UpdatePassword {
                    current_password: "correct-horse-1".to_string(),
                    new_password: "correct-horse-1".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(UserError::InvalidRequest(_))));

        // Valid change
        service
            .update_password(
                user.id,
                UpdatePassword {
                    current_password: "correct-horse-1".to_string(),
                    new_password: "brand-new-pass1".to_string(),
                },
            )
            .await
            .unwrap();

        service
            .authenticate("a@example.com", "brand-new-pass1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_user_email_conflict() {
        let service = UserService::new(InMemoryUserRepository::new());
        service.create_user(create_input("a@example.com")).await.unwrap();
        let bob = service.create_user(create_input("b@example.com")).await.unwrap();

        let result = service
            .update_user(
                bob.id,
                UserUpdate {
                    email: Some("a@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(UserError::EmailConflict(_))));

        // Keeping the same email is fine
        service
            .update_user(
                bob.id,
                UserUpdate {
                    email: Some("b@example.com".to_string()),
                    full_name: Some("Bob".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reset_password_flow() {
        let service = UserService::new(InMemoryUserRepository::new());
        service.create_user(create_input("a@example.com")).await.unwrap();

        service
            .reset_password("a@example.com", "after-reset-pw1")
            .await
            .unwrap();
        service
            .authenticate("a@example.com", "after-reset-pw1")
            .await
            .unwrap();

        let result = service.reset_password("nobody@example.com", "whatever1").await;
        assert!(matches!(result, Err(UserError::EmailNotFound(_))));
    }

    #[tokio::test]
    async fn test_ensure_first_superuser_is_idempotent() {
        let service = UserService::new(InMemoryUserRepository::new());

        let created = service
            .ensure_first_superuser("admin@example.com", "admin-password1")
            .await
            .unwrap();
        assert!(created.as_ref().is_some_and(|u| u.is_superuser));

        let second = service
            .ensure_first_superuser("admin@example.com", "admin-password1")
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let service = UserService::new(repo);
        let result = service.delete_user(Uuid::now_v7()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }
}
