use super::config::JwtConfig;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token is allowed to be used for.
///
/// Access and password-reset tokens are signed with the same secret but
/// carry a distinct purpose claim, so one can never stand in for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    Reset,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: user id for access tokens, email for reset tokens
    pub sub: String,
    /// Token purpose
    pub purpose: TokenPurpose,
    /// Expiration time (unix timestamp)
    pub exp: i64,
    /// Issued at (unix timestamp)
    pub iat: i64,
}

/// Stateless JWT issuance and verification (HS256).
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
}

impl JwtAuth {
    /// Create a new auth instance from configuration.
    ///
    /// # Example
    /// ```ignore
    /// use axum_helpers::auth::{JwtAuth, JwtConfig};
    /// use core_config::FromEnv;
    ///
    /// let config = JwtConfig::from_env()?;
    /// let auth = JwtAuth::new(&config);
    /// ```
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
        }
    }

    /// Create an access token for the given user id
    pub fn create_access_token(&self, user_id: Uuid, ttl: Duration) -> eyre::Result<String> {
        self.create_token(&user_id.to_string(), TokenPurpose::Access, ttl)
    }

    /// Create a password reset token for the given email
    pub fn create_reset_token(&self, email: &str, ttl: Duration) -> eyre::Result<String> {
        self.create_token(email, TokenPurpose::Reset, ttl)
    }

    fn create_token(&self, sub: &str, purpose: TokenPurpose, ttl: Duration) -> eyre::Result<String> {
        let now = Utc::now();

        let claims = JwtClaims {
            sub: sub.to_string(),
            purpose,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify an access token and return the user id it was issued for.
    ///
    /// Fails on bad signature, expiry, or a non-access purpose.
    pub fn verify_access_token(&self, token: &str) -> eyre::Result<Uuid> {
        let claims = self.verify(token, TokenPurpose::Access)?;
        let user_id = Uuid::parse_str(&claims.sub)?;
        Ok(user_id)
    }

    /// Verify a password reset token and return the email it was issued for.
    pub fn verify_reset_token(&self, token: &str) -> eyre::Result<String> {
        let claims = self.verify(token, TokenPurpose::Reset)?;
        Ok(claims.sub)
    }

    fn verify(&self, token: &str, expected: TokenPurpose) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        let claims = token_data.claims;
        if claims.purpose != expected {
            eyre::bail!("token purpose mismatch");
        }

        Ok(claims)
    }
}

/// Extract a bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-key-with-at-least-32-chars"))
    }

    #[test]
    fn test_access_token_round_trip() {
        let auth = auth();
        let user_id = Uuid::now_v7();

        let token = auth
            .create_access_token(user_id, Duration::minutes(30))
            .unwrap();
        let decoded = auth.verify_access_token(&token).unwrap();

        assert_eq!(decoded, user_id);
    }

    #[test]
    fn test_reset_token_round_trip() {
        let auth = auth();

        let token = auth
            .create_reset_token("user@example.com", Duration::hours(48))
            .unwrap();
        let email = auth.verify_reset_token(&token).unwrap();

        assert_eq!(email, "user@example.com");
    }

    #[test]
    fn test_purposes_are_disjoint() {
        let auth = auth();
        let user_id = Uuid::now_v7();

        let access = auth
            .create_access_token(user_id, Duration::minutes(30))
            .unwrap();
        let reset = auth
            .create_reset_token("user@example.com", Duration::hours(1))
            .unwrap();

        assert!(auth.verify_reset_token(&access).is_err());
        assert!(auth.verify_access_token(&reset).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = auth();
        let user_id = Uuid::now_v7();

        // Past the default 60s validation leeway
        let token = auth
            .create_access_token(user_id, Duration::seconds(-120))
            .unwrap();

        assert!(auth.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let auth = auth();
        let other = JwtAuth::new(&JwtConfig::new("another-secret-key-with-32-chars-min"));
        let user_id = Uuid::now_v7();

        let token = auth
            .create_access_token(user_id, Duration::minutes(30))
            .unwrap();

        assert!(other.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi"));

        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic dXNlcg==".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), None);

        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
