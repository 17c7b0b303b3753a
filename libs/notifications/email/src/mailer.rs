//! High-level mailer facade used by API handlers.
//!
//! Wraps an [`EmailProvider`] and the [`TemplateEngine`] behind methods
//! for the transactional emails this system sends.

use crate::error::{EmailError, EmailResult};
use crate::models::Email;
use crate::provider::{EmailProvider, SmtpConfig, SmtpProvider};
use crate::templates::TemplateEngine;
use core_config::env_or_default;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Mailer configuration beyond SMTP transport settings.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Project name used in subjects and bodies
    pub project_name: String,
    /// Base URL of the frontend, used to build links
    pub frontend_url: String,
}

impl MailerConfig {
    /// Load from environment variables.
    ///
    /// - `PROJECT_NAME` (default: "Catalog")
    /// - `FRONTEND_URL` (default: "http://localhost:5173")
    pub fn from_env() -> Self {
        Self {
            project_name: env_or_default("PROJECT_NAME", "Catalog"),
            frontend_url: env_or_default("FRONTEND_URL", "http://localhost:5173"),
        }
    }
}

/// Sends transactional emails through a provider.
#[derive(Clone)]
pub struct Mailer {
    provider: Arc<dyn EmailProvider>,
    templates: Arc<TemplateEngine>,
    config: MailerConfig,
}

impl Mailer {
    /// Create a mailer with an explicit provider (tests use the mock).
    pub fn new(provider: Arc<dyn EmailProvider>, config: MailerConfig) -> EmailResult<Self> {
        let templates = TemplateEngine::new().map_err(|e| EmailError::Template(e.to_string()))?;

        Ok(Self {
            provider,
            templates: Arc::new(templates),
            config,
        })
    }

    /// Create a mailer from environment variables.
    ///
    /// Returns `Ok(None)` when `SMTP_HOST` is unset: email sending is
    /// disabled and callers should skip dispatch.
    pub fn from_env() -> EmailResult<Option<Self>> {
        let Some(smtp_config) =
            SmtpConfig::from_env().map_err(|e| EmailError::Config(e.to_string()))?
        else {
            info!("SMTP_HOST not set, email sending disabled");
            return Ok(None);
        };

        let provider =
            SmtpProvider::new(smtp_config).map_err(|e| EmailError::Config(e.to_string()))?;

        Ok(Some(Self::new(Arc::new(provider), MailerConfig::from_env())?))
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Send a password recovery email carrying a reset link.
    pub async fn send_reset_password_email(
        &self,
        to_email: &str,
        token: &str,
        valid_hours: i64,
    ) -> EmailResult<()> {
        let link = format!(
            "{}/reset-password?token={}",
            self.config.frontend_url, token
        );

        let data = json!({
            "project_name": self.config.project_name,
            "email": to_email,
            "link": link,
            "valid_hours": valid_hours,
        });

        self.send_templated(to_email, "reset_password", &data).await
    }

    /// Send a welcome email for a freshly created account.
    pub async fn send_new_account_email(&self, to_email: &str, username: &str) -> EmailResult<()> {
        let data = json!({
            "project_name": self.config.project_name,
            "username": username,
            "link": self.config.frontend_url,
        });

        self.send_templated(to_email, "new_account", &data).await
    }

    async fn send_templated(
        &self,
        to_email: &str,
        template: &str,
        data: &serde_json::Value,
    ) -> EmailResult<()> {
        let rendered = self
            .templates
            .render(template, data)
            .map_err(|e| EmailError::Template(e.to_string()))?;

        let mut email = Email::new(to_email, rendered.subject);
        email.body_text = rendered.body_text;
        email.body_html = rendered.body_html;

        let result = self
            .provider
            .send(&email)
            .await
            .map_err(|e| EmailError::Provider(e.to_string()))?;

        info!(
            to = %to_email,
            template = %template,
            message_id = %result.message_id,
            "Transactional email sent"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockSmtpProvider;

    fn mailer_with(provider: Arc<MockSmtpProvider>) -> Mailer {
        Mailer::new(
            provider,
            MailerConfig {
                project_name: "Catalog".to_string(),
                frontend_url: "https://app.example.com".to_string(),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_reset_password_email() {
        let provider = Arc::new(MockSmtpProvider::new());
        let mailer = mailer_with(provider.clone());

        mailer
            .send_reset_password_email("user@example.com", "tok123", 48)
            .await
            .unwrap();

        let sent = provider.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "user@example.com");
        assert!(sent[0].subject.contains("Password recovery"));
        assert!(
            sent[0]
                .body_html
                .as_ref()
                .unwrap()
                .contains("https://app.example.com/reset-password?token=tok123")
        );
    }

    #[tokio::test]
    async fn test_send_new_account_email() {
        let provider = Arc::new(MockSmtpProvider::new());
        let mailer = mailer_with(provider.clone());

        mailer
            .send_new_account_email("new@example.com", "new@example.com")
            .await
            .unwrap();

        assert!(provider.was_sent_to("new@example.com").await);
    }

    #[tokio::test]
    async fn test_provider_failure_is_surfaced() {
        let provider = Arc::new(MockSmtpProvider::failing("SMTP down"));
        let mailer = mailer_with(provider);

        let result = mailer
            .send_reset_password_email("user@example.com", "tok", 48)
            .await;

        assert!(matches!(result, Err(EmailError::Provider(_))));
    }

    #[test]
    fn test_mailer_disabled_without_smtp_host() {
        temp_env::with_var_unset("SMTP_HOST", || {
            let mailer = Mailer::from_env().unwrap();
            assert!(mailer.is_none());
        });
    }
}
