//! Email template management with Handlebars
//!
//! This module provides:
//! - `TemplateEngine`: Handlebars-based template rendering
//! - Built-in templates for password recovery and new accounts

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::HashMap;

/// Rendered template result
#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Email template definition
#[derive(Clone, Debug)]
pub struct EmailTemplate {
    pub name: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Handlebars-based template engine
///
/// Supports:
/// - Variables: `{{name}}`
/// - Conditionals: `{{#if condition}}...{{/if}}`
/// - HTML escaping: `{{{unescaped}}}` for raw HTML
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    templates: HashMap<String, EmailTemplate>,
}

impl TemplateEngine {
    /// Create a new TemplateEngine with the built-in templates
    pub fn new() -> Result<Self> {
        let mut engine = Self {
            handlebars: Handlebars::new(),
            templates: HashMap::new(),
        };

        engine.register_defaults()?;

        Ok(engine)
    }

    /// Register a template
    pub fn register(&mut self, template: EmailTemplate) -> Result<()> {
        self.handlebars
            .register_template_string(&format!("{}_subject", template.name), &template.subject)
            .map_err(|e| eyre!("Failed to register subject template: {}", e))?;

        if let Some(text) = &template.body_text {
            self.handlebars
                .register_template_string(&format!("{}_text", template.name), text)
                .map_err(|e| eyre!("Failed to register text template: {}", e))?;
        }

        if let Some(html) = &template.body_html {
            self.handlebars
                .register_template_string(&format!("{}_html", template.name), html)
                .map_err(|e| eyre!("Failed to register HTML template: {}", e))?;
        }

        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    /// Render a template by name
    pub fn render(&self, name: &str, data: &Value) -> Result<RenderedTemplate> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| eyre!("Template not found: {}", name))?;

        let subject = self
            .handlebars
            .render(&format!("{}_subject", name), data)
            .map_err(|e| eyre!("Failed to render subject: {}", e))?;

        let body_text = if template.body_text.is_some() {
            Some(
                self.handlebars
                    .render(&format!("{}_text", name), data)
                    .map_err(|e| eyre!("Failed to render text: {}", e))?,
            )
        } else {
            None
        };

        let body_html = if template.body_html.is_some() {
            Some(
                self.handlebars
                    .render(&format!("{}_html", name), data)
                    .map_err(|e| eyre!("Failed to render HTML: {}", e))?,
            )
        } else {
            None
        };

        Ok(RenderedTemplate {
            subject,
            body_text,
            body_html,
        })
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// List all registered templates
    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.keys().map(|s| s.as_str()).collect()
    }

    /// Register the built-in email templates
    fn register_defaults(&mut self) -> Result<()> {
        // Password recovery
        self.register(EmailTemplate {
            name: "reset_password".to_string(),
            subject: "{{project_name}} - Password recovery for user {{email}}".to_string(),
            body_text: Some(
                r#"Hello {{email}},

We received a request to reset your password for {{project_name}}.

Open the link below to set a new password:

{{link}}

The link is valid for {{valid_hours}} hours.

If you didn't request a password reset, you can safely ignore this email."#
                    .to_string(),
            ),
            body_html: Some(
                r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h1 style="color: #2563eb;">Password Recovery</h1>
    <p>Hello {{email}},</p>
    <p>We received a request to reset your password for <strong>{{project_name}}</strong>.</p>
    <p style="text-align: center; margin: 30px 0;">
        <a href="{{link}}"
           style="background-color: #dc2626; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; display: inline-block;">
            Reset Password
        </a>
    </p>
    <p style="color: #666; font-size: 14px;">The link is valid for {{valid_hours}} hours.</p>
    <p style="color: #666; font-size: 14px;">If you didn't request a password reset, you can safely ignore this email.</p>
</body>
</html>"#
                    .to_string(),
            ),
        })?;

        // New account
        self.register(EmailTemplate {
            name: "new_account".to_string(),
            subject: "{{project_name}} - New account for user {{username}}".to_string(),
            body_text: Some(
                r#"Hello {{username}},

An account has been created for you on {{project_name}}.

You can log in at {{link}} with your email address.

Welcome aboard!"#
                    .to_string(),
            ),
            body_html: Some(
                r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h1 style="color: #2563eb;">Welcome to {{project_name}}!</h1>
    <p>Hello {{username}},</p>
    <p>An account has been created for you on <strong>{{project_name}}</strong>.</p>
    <p style="text-align: center; margin: 30px 0;">
        <a href="{{link}}"
           style="background-color: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; display: inline-block;">
            Go to Dashboard
        </a>
    </p>
    <p>Welcome aboard!</p>
</body>
</html>"#
                    .to_string(),
            ),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_engine_has_builtins() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.has_template("reset_password"));
        assert!(engine.has_template("new_account"));
    }

    #[test]
    fn test_reset_password_rendering() {
        let engine = TemplateEngine::new().unwrap();

        let data = serde_json::json!({
            "project_name": "Catalog",
            "email": "user@example.com",
            "link": "https://app.example.com/reset-password?token=abc",
            "valid_hours": 48,
        });

        let rendered = engine.render("reset_password", &data).unwrap();

        assert!(rendered.subject.contains("user@example.com"));
        assert!(rendered.subject.contains("Catalog"));
        assert!(rendered.body_text.unwrap().contains("48 hours"));
        assert!(
            rendered
                .body_html
                .unwrap()
                .contains("reset-password?token=abc")
        );
    }

    #[test]
    fn test_custom_template() {
        let mut engine = TemplateEngine::new().unwrap();

        let template = EmailTemplate {
            name: "custom".to_string(),
            subject: "Custom: {{title}}".to_string(),
            body_text: Some("{{content}}".to_string()),
            body_html: None,
        };

        engine.register(template).unwrap();

        let data = serde_json::json!({
            "title": "Test",
            "content": "Hello World"
        });

        let rendered = engine.render("custom", &data).unwrap();
        assert_eq!(rendered.subject, "Custom: Test");
        assert_eq!(rendered.body_text.unwrap(), "Hello World");
        assert!(rendered.body_html.is_none());
    }

    #[test]
    fn test_unknown_template() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.render("nope", &serde_json::json!({})).is_err());
    }
}
