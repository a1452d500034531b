//! Outbound email for the contact form: SMTP via lettre.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::config::EmailConfig;
use crate::error::MailError;

/// A fully composed HTML email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

/// Sends composed emails to the site's inbox.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// SMTP relay with STARTTLS and credentials from [`EmailConfig`].
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        let from = self
            .config
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidAddress {
                address: self.config.from_address.clone(),
                reason: format!("{e}"),
            })?;
        let to = self
            .config
            .to_address
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidAddress {
                address: self.config.to_address.clone(),
                reason: format!("{e}"),
            })?;

        let mut builder = Message::builder().from(from).to(to).subject(&email.subject);
        if let Some(reply_to) = &email.reply_to {
            match reply_to.parse::<Mailbox>() {
                Ok(mailbox) => builder = builder.reply_to(mailbox),
                Err(e) => tracing::warn!(reply_to = %reply_to, error = %e, "Skipping invalid reply-to"),
            }
        }

        builder
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .map_err(|e| MailError::Build(e.to_string()))
    }

    fn send_blocking(config: &EmailConfig, message: &Message) -> Result<(), MailError> {
        let creds = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );
        let transport = SmtpTransport::starttls_relay(&config.smtp_host)
            .map_err(|e| MailError::Send(format!("SMTP relay error: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        transport
            .send(message)
            .map_err(|e| MailError::Send(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = self.build_message(&email)?;
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || Self::send_blocking(&config, &message))
            .await
            .map_err(|e| MailError::Send(format!("SMTP task panicked: {e}")))??;

        tracing::info!(to = %self.config.to_address, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Escape text for safe interpolation into HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
