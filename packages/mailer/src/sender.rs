//! Email sender trait and simple implementations.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::EmailMessage;

/// Mail errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Email request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Email provider rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Email delivery timed out")]
    Timeout,
    #[error("Mailer unavailable: {0}")]
    Unavailable(String),
}

/// Result type for a single send.
pub type SendResult = Result<(), MailError>;

/// Future type for async sends.
pub type SendFuture = Pin<Box<dyn Future<Output = SendResult> + Send>>;

/// Capability to send one email.
///
/// Implementations must be cheap to call concurrently; the mailer actor
/// issues every message of a batch at once.
pub trait EmailSender: Send + Sync + 'static {
    fn send(&self, message: EmailMessage) -> SendFuture;
}

/// Sender that only logs. Used when no email provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSender;

impl EmailSender for LogSender {
    fn send(&self, message: EmailMessage) -> SendFuture {
        Box::pin(async move {
            tracing::info!(
                "Email provider not configured; dropping '{}' to {}",
                message.subject,
                message.to
            );
            Ok(())
        })
    }
}

/// A simple function-based sender.
pub struct FnSender<F>
where
    F: Fn(EmailMessage) -> SendFuture + Send + Sync + 'static,
{
    send: F,
}

impl<F> FnSender<F>
where
    F: Fn(EmailMessage) -> SendFuture + Send + Sync + 'static,
{
    /// Create a new function-based sender.
    pub fn new(send: F) -> Self {
        Self { send }
    }
}

impl<F> EmailSender for FnSender<F>
where
    F: Fn(EmailMessage) -> SendFuture + Send + Sync + 'static,
{
    fn send(&self, message: EmailMessage) -> SendFuture {
        (self.send)(message)
    }
}
