//! Outbound notification mail
//!
//! Provides the delivery abstraction for credential and passcode messages.
//! Delivery is strictly best-effort: callers log failures and carry on, a
//! failed mail never fails the request that triggered it.

use async_trait::async_trait;

/// A message handed to the mail collaborator
#[derive(Debug, Clone)]
pub struct MailMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Trait for outbound mail delivery implementations
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a single message.
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()>;
}

/// Mailer that records messages to the log instead of delivering them.
///
/// Stands in wherever no real delivery backend is wired up (local profile,
/// tests); the service treats it exactly like a real mailer.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    /// Creates a log-only mailer sending "from" the given address.
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()> {
        tracing::info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            body_len = message.body.len(),
            "Mail delivery (log only)"
        );
        Ok(())
    }
}

/// Fire-and-forget helper: send, log any failure, never propagate it.
pub async fn send_best_effort(mailer: &dyn Mailer, message: MailMessage) {
    if let Err(err) = mailer.send(&message).await {
        tracing::warn!(
            to = %message.to,
            subject = %message.subject,
            error = %err,
            "Mail delivery failed; continuing"
        );
    }
}
