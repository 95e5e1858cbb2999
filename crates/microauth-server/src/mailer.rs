//! Outgoing mail for invitations.
//!
//! Delivery goes over SMTP with STARTTLS and plain credentials. The log
//! mailer is an explicit development fallback that delivers nothing.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use microauth_core::error::{MicroauthError, MicroauthResult};
use microauth_core::notify::{EmailMessage, Notifier};
use tracing::{info, warn};

use crate::config::{MailerConfig, SmtpConfig};

/// Sends through an SMTP relay.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the pooled transport. No connection is opened until the
    /// first send.
    pub fn new(config: &SmtpConfig) -> MicroauthResult<Self> {
        let from = config.from.parse::<Mailbox>().map_err(|e| {
            MicroauthError::Delivery(format!("invalid sender address {:?}: {e}", config.from))
        })?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MicroauthError::Delivery(format!("SMTP relay {}: {e}", config.host)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

/// Plain-text message from `from` to the recipient of `message`.
fn build_message(from: &Mailbox, message: &EmailMessage) -> MicroauthResult<Message> {
    let to = message.to.parse::<Mailbox>().map_err(|e| {
        MicroauthError::Delivery(format!("invalid recipient address {:?}: {e}", message.to))
    })?;
    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|e| MicroauthError::Delivery(format!("message build: {e}")))
}

impl Notifier for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> MicroauthResult<()> {
        let email = build_message(&self.from, &message)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| MicroauthError::Delivery(format!("SMTP send: {e}")))?;

        info!(to = %message.to, subject = %message.subject, "email sent");
        Ok(())
    }
}

/// Records outgoing mail in the log. Only the recipient and subject are
/// logged; the body carries the one-time code.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Notifier for LogMailer {
    async fn send(&self, message: EmailMessage) -> MicroauthResult<()> {
        info!(to = %message.to, subject = %message.subject, "email not delivered (log mailer)");
        Ok(())
    }
}

/// The notifier selected by configuration.
#[derive(Clone)]
pub enum Mailer {
    Smtp(SmtpMailer),
    Log(LogMailer),
}

impl Mailer {
    pub fn from_config(config: &MailerConfig) -> MicroauthResult<Self> {
        match config {
            MailerConfig::Smtp(smtp) => Ok(Self::Smtp(SmtpMailer::new(smtp)?)),
            MailerConfig::Log => {
                warn!("no SMTP relay configured; invite emails are only logged");
                Ok(Self::Log(LogMailer))
            }
        }
    }
}

impl Notifier for Mailer {
    async fn send(&self, message: EmailMessage) -> MicroauthResult<()> {
        match self {
            Self::Smtp(mailer) => mailer.send(message).await,
            Self::Log(mailer) => mailer.send(message).await,
        }
    }
}
