//! SMTP email provider using lettre

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use core_config::{env_optional, env_or_default};
use eyre::{Result, WrapErr};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::sync::Arc;

/// SMTP provider configuration
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub use_tls: bool,
}

impl SmtpConfig {
    /// Load SMTP settings from environment variables.
    ///
    /// Returns `None` when `SMTP_HOST` is unset, which disables email
    /// sending entirely.
    ///
    /// Environment variables:
    /// - `SMTP_HOST` - SMTP server hostname
    /// - `SMTP_PORT` (default: 587)
    /// - `SMTP_USERNAME` / `SMTP_PASSWORD` (optional, empty disables auth)
    /// - `SMTP_TLS` (default: true)
    /// - `EMAILS_FROM_EMAIL` (required when SMTP_HOST is set)
    /// - `EMAILS_FROM_NAME` (default: "Notifications")
    pub fn from_env() -> Result<Option<Self>> {
        let Some(host) = env_optional("SMTP_HOST") else {
            return Ok(None);
        };

        let port: u16 = env_or_default("SMTP_PORT", "587")
            .parse()
            .wrap_err("Invalid SMTP_PORT")?;

        let config = Self {
            host,
            port,
            username: env_optional("SMTP_USERNAME").unwrap_or_default(),
            password: env_optional("SMTP_PASSWORD").unwrap_or_default(),
            from_email: env_optional("EMAILS_FROM_EMAIL")
                .ok_or_else(|| eyre::eyre!("EMAILS_FROM_EMAIL not set"))?,
            from_name: env_or_default("EMAILS_FROM_NAME", "Notifications"),
            use_tls: env_or_default("SMTP_TLS", "true") == "true",
        };

        Ok(Some(config))
    }
}

/// SMTP email provider
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: Arc<SmtpConfig>,
}

impl SmtpProvider {
    /// Create a new SMTP provider
    pub fn new(config: SmtpConfig) -> Result<Self> {
        let transport = if config.use_tls {
            let creds = Credentials::new(config.username.clone(), config.password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .wrap_err("Failed to create SMTP relay")?
                .credentials(creds)
                .port(config.port)
                .build()
        } else if !config.username.is_empty() {
            let creds = Credentials::new(config.username.clone(), config.password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .credentials(creds)
                .port(config.port)
                .build()
        } else {
            // No auth (for Mailpit/Mailhog)
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .build()
        };

        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    fn build_message(&self, email: &Email) -> Result<Message> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .wrap_err("Invalid from address")?;

        let to: Mailbox = email.to.parse().wrap_err("Invalid to address")?;

        let mut builder = Message::builder().from(from).to(to).subject(&email.subject);

        if let Some(reply_to) = &email.reply_to {
            let reply_to_mailbox: Mailbox = reply_to.parse().wrap_err("Invalid reply-to address")?;
            builder = builder.reply_to(reply_to_mailbox);
        }

        let message = match (&email.body_text, &email.body_html) {
            (Some(text), Some(html)) => builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_PLAIN)
                                .body(text.clone()),
                        )
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_HTML)
                                .body(html.clone()),
                        ),
                )
                .wrap_err("Failed to build multipart message")?,
            (Some(text), None) => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.clone())
                .wrap_err("Failed to build text message")?,
            (None, Some(html)) => builder
                .header(ContentType::TEXT_HTML)
                .body(html.clone())
                .wrap_err("Failed to build HTML message")?,
            (None, None) => {
                return Err(eyre::eyre!("Email must have either text or HTML body"));
            }
        };

        Ok(message)
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        let message = self.build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .wrap_err("Failed to send email via SMTP")?;

        let message_id = response
            .message()
            .next()
            .map(|s| s.to_string())
            .unwrap_or_else(|| email.id.clone());

        tracing::info!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            "Email sent successfully"
        );

        Ok(SendResult { message_id })
    }

    async fn health_check(&self) -> Result<()> {
        self.transport
            .test_connection()
            .await
            .wrap_err("SMTP health check failed")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_config_disabled_without_host() {
        temp_env::with_var_unset("SMTP_HOST", || {
            let config = SmtpConfig::from_env().unwrap();
            assert!(config.is_none());
        });
    }

    #[test]
    fn test_smtp_config_from_env() {
        temp_env::with_vars(
            [
                ("SMTP_HOST", Some("smtp.example.com")),
                ("SMTP_PORT", Some("2525")),
                ("EMAILS_FROM_EMAIL", Some("noreply@example.com")),
                ("SMTP_TLS", Some("false")),
            ],
            || {
                let config = SmtpConfig::from_env().unwrap().unwrap();
                assert_eq!(config.host, "smtp.example.com");
                assert_eq!(config.port, 2525);
                assert_eq!(config.from_email, "noreply@example.com");
                assert!(!config.use_tls);
            },
        );
    }

    #[test]
    fn test_smtp_config_requires_from_email() {
        temp_env::with_vars(
            [
                ("SMTP_HOST", Some("smtp.example.com")),
                ("EMAILS_FROM_EMAIL", None::<&str>),
            ],
            || {
                assert!(SmtpConfig::from_env().is_err());
            },
        );
    }
}
