//! Outbound email for the job board.
//!
//! This crate provides the [`EmailSender`] capability, an EmailJS-backed
//! implementation, and a Ractor-based mailer actor that fans deliveries
//! out concurrently.
//!
//! # Architecture
//!
//! - `EmailSender` - Sends a single message; implemented by `EmailJsSender`,
//!   `LogSender` and `FnSender`
//! - `MailerActor` - Owns a sender and delivers batches without blocking callers
//! - `Mailer` - Cloneable handle used by request handlers
//!
//! # Usage
//!
//! ```ignore
//! use mailer::{LogSender, Mailer};
//!
//! let (mailer, _handle) = Mailer::start(Arc::new(LogSender)).await?;
//! mailer.broadcast(messages);
//! ```

mod actor;
mod emailjs;
mod message;
mod sender;

pub use actor::{DeliveryFailure, DeliveryReport, Mailer, MailerActor, MailerArgs, MailerMessage};
pub use emailjs::{EMAILJS_BASE_URL, EmailJsConfig, EmailJsSender};
pub use message::{EmailKind, EmailMessage};
pub use sender::{EmailSender, FnSender, LogSender, MailError, SendFuture, SendResult};

/// Error returned when the mailer actor fails to start.
pub use ractor::SpawnErr;
