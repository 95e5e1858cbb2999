//! Outbound notification channel.

use crate::error::MicroauthResult;

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers email. Success means the transport accepted the message;
/// there is no delivery receipt and no retry contract.
pub trait Notifier: Send + Sync {
    fn send(&self, message: EmailMessage) -> impl Future<Output = MicroauthResult<()>> + Send;
}
