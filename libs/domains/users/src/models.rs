use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// User entity - represents a user stored in MongoDB
///
/// The argon2 hash is part of the stored document and therefore serialized,
/// but it never leaves the service layer: API responses use [`UserPublic`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// User email (unique, app-enforced)
    pub email: String,
    /// Optional display name
    pub full_name: Option<String>,
    /// Argon2 password hash
    pub hashed_password: String,
    /// Whether the account can log in
    pub is_active: bool,
    /// Whether the account has admin privileges
    pub is_superuser: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user (password must already be hashed)
    pub fn new(input: UserCreate, hashed_password: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            email: input.email,
            full_name: input.full_name,
            hashed_password,
            is_active: input.is_active,
            is_superuser: input.is_superuser,
            created_at: Utc::now(),
        }
    }

    /// Apply an admin update (password must already be hashed if provided)
    pub fn apply_update(&mut self, update: UserUpdate, new_password_hash: Option<String>) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(full_name) = update.full_name {
            self.full_name = Some(full_name);
        }
        if let Some(hash) = new_password_hash {
            self.hashed_password = hash;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(is_superuser) = update.is_superuser {
            self.is_superuser = is_superuser;
        }
    }

    /// Apply a self-service profile update
    pub fn apply_update_me(&mut self, update: UserUpdateMe) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(full_name) = update.full_name {
            self.full_name = Some(full_name);
        }
    }
}

fn default_true() -> bool {
    true
}

/// DTO for creating a user (admin endpoint and superuser bootstrap)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UserCreate {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 40))]
    pub password: String,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

/// DTO for open registration
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UserRegister {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 40))]
    pub password: String,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
}

impl From<UserRegister> for UserCreate {
    fn from(input: UserRegister) -> Self {
        Self {
            email: input.email,
            password: input.password,
            full_name: input.full_name,
            is_active: true,
            is_superuser: false,
        }
    }
}

/// DTO for admin updates to any user
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UserUpdate {
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 40))]
    pub password: Option<String>,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

/// DTO for self-service profile updates
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UserUpdateMe {
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
}

/// DTO for changing the caller's own password
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdatePassword {
    #[validate(length(min = 8, max = 40))]
    pub current_password: String,
    #[validate(length(min = 8, max = 40))]
    pub new_password: String,
}

/// User as exposed over the API (no password hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
        }
    }
}

/// Paginated list of users with the total matching count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsersPublic {
    pub data: Vec<UserPublic>,
    pub count: u64,
}

/// Query filters for listing users
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct UserFilter {
    /// Case-insensitive substring match against full_name and email
    pub q: Option<String>,
    /// Number of users to skip
    #[serde(default)]
    pub skip: u64,
    /// Maximum number of users to return
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// OAuth2-style password grant form for `/login/access-token`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginForm {
    /// The user's email address
    pub username: String,
    pub password: String,
}

/// Successful login payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: String,
}

/// DTO for completing a password reset
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewPassword {
    pub token: String,
    #[validate(length(min = 8, max = 40))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_input(email: &str) -> UserCreate {
        UserCreate {
            email: email.to_string(),
            password: "secret-password".to_string(),
            full_name: None,
            is_active: true,
            is_superuser: false,
        }
    }

    #[test]
    fn test_new_user_defaults() {
        let user = User::new(create_input("a@example.com"), "hash".to_string());
        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert_eq!(user.hashed_password, "hash");
    }

    #[test]
    fn test_apply_update_replaces_hash_only_when_provided() {
        let mut user = User::new(create_input("a@example.com"), "hash".to_string());

        user.apply_update(
            UserUpdate {
                full_name: Some("Alice".to_string()),
                ..Default::default()
            },
            None,
        );
        assert_eq!(user.hashed_password, "hash");
        assert_eq!(user.full_name.as_deref(), Some("Alice"));

        user.apply_update(UserUpdate::default(), Some("newhash".to_string()));
        assert_eq!(user.hashed_password, "newhash");
    }

    #[test]
    fn test_user_create_validation() {
        let mut input = create_input("not-an-email");
        assert!(input.validate().is_err());

        input.email = "a@example.com".to_string();
        input.password = "short".to_string();
        assert!(input.validate().is_err());

        input.password = "long-enough-password".to_string();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_user_public_drops_hash() {
        let user = User::new(create_input("a@example.com"), "hash".to_string());
        let public: UserPublic = user.into();
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert!(json.get("id").is_some());
    }

    #[test]
    fn test_register_converts_to_non_superuser_create() {
        let register = UserRegister {
            email: "a@example.com".to_string(),
            password: "long-enough-password".to_string(),
            full_name: Some("Alice".to_string()),
        };
        let create: UserCreate = register.into();
        assert!(create.is_active);
        assert!(!create.is_superuser);
    }
}
