//! JWT configuration.
//!
//! Implements the `FromEnv` trait from `core_config`, following the same
//! pattern as `MongoConfig` and `ServerConfig`.

use chrono::Duration;
use core_config::{ConfigError, FromEnv, env_or_default, env_required};

/// JWT authentication configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required) - Must be at least 32 characters for security
/// - `ACCESS_TOKEN_EXPIRE_MINUTES` (optional, default: 11520, i.e. 8 days)
/// - `EMAIL_RESET_TOKEN_EXPIRE_HOURS` (optional, default: 48)
///
/// # Example
///
/// ```ignore
/// use axum_helpers::JwtConfig;
/// use core_config::FromEnv;
///
/// // From environment variables
/// let config = JwtConfig::from_env()?;
///
/// // Manual construction (for testing)
/// let config = JwtConfig::new("my-super-secret-key-that-is-at-least-32-chars");
/// ```
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// JWT signing secret (minimum 32 characters)
    pub secret: String,

    /// Access token lifetime in minutes
    pub access_token_expire_minutes: i64,

    /// Password reset token lifetime in hours
    pub email_reset_token_expire_hours: i64,
}

impl JwtConfig {
    /// Create a new JwtConfig with the given secret and default lifetimes.
    ///
    /// # Panics
    /// Panics if the secret is less than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= 32,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            access_token_expire_minutes: 60 * 24 * 8,
            email_reset_token_expire_hours: 48,
        }
    }

    /// Access token lifetime as a [`Duration`]
    pub fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_expire_minutes)
    }

    /// Password reset token lifetime as a [`Duration`]
    pub fn reset_ttl(&self) -> Duration {
        Duration::hours(self.email_reset_token_expire_hours)
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < 32 {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters for security (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        let access_token_expire_minutes = env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "11520")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES".to_string(),
                details: format!("{}", e),
            })?;

        let email_reset_token_expire_hours = env_or_default("EMAIL_RESET_TOKEN_EXPIRE_HOURS", "48")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "EMAIL_RESET_TOKEN_EXPIRE_HOURS".to_string(),
                details: format!("{}", e),
            })?;

        Ok(Self {
            secret,
            access_token_expire_minutes,
            email_reset_token_expire_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_new_valid() {
        let secret = "this-is-a-valid-secret-with-32-chars!";
        let config = JwtConfig::new(secret);
        assert_eq!(config.secret, secret);
        assert_eq!(config.access_token_expire_minutes, 11520);
        assert_eq!(config.email_reset_token_expire_hours, 48);
    }

    #[test]
    #[should_panic(expected = "JWT secret must be at least 32 characters")]
    fn test_jwt_config_new_too_short() {
        JwtConfig::new("short");
    }

    #[test]
    fn test_jwt_config_ttls() {
        let config = JwtConfig::new("this-is-a-valid-secret-with-32-chars!");
        assert_eq!(config.access_ttl(), Duration::days(8));
        assert_eq!(config.reset_ttl(), Duration::hours(48));
    }

    #[test]
    fn test_jwt_config_from_env_valid() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some("this-is-a-valid-secret-with-32-chars!")),
                ("ACCESS_TOKEN_EXPIRE_MINUTES", Some("60")),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, "this-is-a-valid-secret-with-32-chars!");
                assert_eq!(config.access_token_expire_minutes, 60);
                assert_eq!(config.email_reset_token_expire_hours, 48);
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_missing() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let config = JwtConfig::from_env();
            assert!(config.is_err());
            let err = config.unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_jwt_config_from_env_too_short() {
        temp_env::with_var("JWT_SECRET", Some("short"), || {
            let config = JwtConfig::from_env();
            assert!(config.is_err());
            let err = config.unwrap_err();
            assert!(err.to_string().contains("32 characters"));
        });
    }
}
