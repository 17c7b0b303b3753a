//! Transactional email library.
//!
//! ## Components
//!
//! - **Email Models**: [`Email`] for email data
//! - **Providers**: SMTP via lettre, and a Mock provider for tests
//! - **Templates**: Handlebars-based [`TemplateEngine`] with built-in
//!   password-reset and new-account templates
//! - **Mailer**: high-level [`Mailer`] facade used by API handlers
//!
//! ## Usage
//!
//! ```ignore
//! use email::Mailer;
//!
//! // None when SMTP_HOST is not configured (emails disabled)
//! if let Some(mailer) = Mailer::from_env()? {
//!     mailer.send_reset_password_email("user@example.com", &token, 48).await?;
//! }
//! ```

pub mod error;
pub mod mailer;
pub mod models;
pub mod provider;
pub mod templates;

// Re-export main types
pub use error::{EmailError, EmailResult};
pub use mailer::{Mailer, MailerConfig};
pub use models::Email;
pub use provider::{EmailProvider, MockSmtpProvider, SendResult, SmtpConfig, SmtpProvider};
pub use templates::{EmailTemplate, RenderedTemplate, TemplateEngine};
