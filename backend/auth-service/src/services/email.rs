/// Email delivery for password reset notifications
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EmailSettings;
use crate::error::{AuthError, Result};

/// Outbound notification sink for security-sensitive messages.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver the raw reset token to the account's email address.
    async fn send_password_reset(&self, recipient: &str, token: &str) -> Result<()>;
}

/// Async SMTP transport wrapper.
///
/// If the SMTP host is empty, operates in no-op mode (logs only) so local
/// development does not need mail infrastructure.
#[derive(Clone)]
pub struct EmailService {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
    reset_base_url: String,
}

impl EmailService {
    pub fn new(config: &EmailSettings) -> Result<Self> {
        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| AuthError::Internal(format!("Invalid SMTP_FROM address: {}", e)))?;

        let transport = if config.smtp_host.trim().is_empty() {
            warn!("SMTP host not configured; email service will operate in no-op mode");
            None
        } else {
            let builder = if config.use_starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            }
            .map_err(|e| {
                AuthError::Internal(format!("Failed to configure SMTP transport: {}", e))
            })?
            .port(config.smtp_port);

            let builder = if let (Some(username), Some(password)) =
                (&config.smtp_username, &config.smtp_password)
            {
                builder.credentials(Credentials::new(username.to_string(), password.to_string()))
            } else {
                builder
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self {
            transport,
            from,
            reset_base_url: config.reset_base_url.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    fn build_reset_link(&self, token: &str) -> String {
        format!("{}?token={}", self.reset_base_url, token)
    }

    async fn send_mail(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        if let Some(transport) = &self.transport {
            let to = recipient.parse::<Mailbox>().map_err(|e| {
                AuthError::Internal(format!("Invalid recipient email address: {}", e))
            })?;

            let email = Message::builder()
                .from(self.from.clone())
                .to(to)
                .subject(subject)
                .header(header::ContentType::TEXT_PLAIN)
                .body(body.to_string())
                .map_err(|e| {
                    AuthError::Internal(format!("Failed to build email message: {}", e))
                })?;

            transport
                .send(email)
                .await
                .map_err(|e| AuthError::Internal(format!("Failed to send email: {}", e)))?;
            info!(subject, "email sent successfully");
        } else {
            info!(
                subject,
                recipient, "Email service running in no-op mode; skipping actual send"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for EmailService {
    async fn send_password_reset(&self, recipient: &str, token: &str) -> Result<()> {
        let link = self.build_reset_link(token);
        let subject = "Password Reset Request";
        let body = format!(
            "We received your password reset request.\n\n\
            Please click the following link to reset your password:\n{}\n\n\
            This link will expire in 1 hour.\n\
            If you did not request this, please ignore this email.",
            link
        );
        self.send_mail(recipient, subject, &body).await
    }
}
