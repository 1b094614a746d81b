//! Mailer actor for fan-out deliveries.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort, SpawnErr};
use serde::Serialize;

use crate::{EmailMessage, EmailSender, MailError};

/// Default upper bound for a single send.
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// Messages for the MailerActor.
#[derive(Debug)]
pub enum MailerMessage {
    /// Deliver a batch without reporting back. Failures are logged.
    Broadcast { messages: Vec<EmailMessage> },

    /// Deliver a batch and reply with the per-recipient outcome.
    Deliver {
        messages: Vec<EmailMessage>,
        reply: RpcReplyPort<DeliveryReport>,
    },
}

/// A recipient whose message could not be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryFailure {
    pub recipient: String,
    pub error: String,
}

/// Outcome of a delivered batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    pub fn all_sent(&self) -> bool {
        self.failed.is_empty()
    }
}

/// State for the mailer actor.
pub struct MailerState {
    sender: Arc<dyn EmailSender>,
    send_timeout: Duration,
}

/// Mailer actor arguments.
pub struct MailerArgs {
    pub sender: Arc<dyn EmailSender>,
    pub send_timeout: Duration,
}

impl MailerArgs {
    pub fn new(sender: Arc<dyn EmailSender>) -> Self {
        Self {
            sender,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

/// Send every message concurrently and collect the outcome.
async fn deliver(
    sender: Arc<dyn EmailSender>,
    send_timeout: Duration,
    messages: Vec<EmailMessage>,
) -> DeliveryReport {
    let sends = messages.into_iter().map(|message| {
        let recipient = message.to.clone();
        let send = sender.send(message);
        async move {
            let result = match tokio::time::timeout(send_timeout, send).await {
                Ok(result) => result,
                Err(_) => Err(MailError::Timeout),
            };
            (recipient, result)
        }
    });

    let mut report = DeliveryReport::default();
    for (recipient, result) in join_all(sends).await {
        match result {
            Ok(()) => report.sent += 1,
            Err(e) => {
                tracing::warn!("Failed to email {}: {}", recipient, e);
                report.failed.push(DeliveryFailure {
                    recipient,
                    error: e.to_string(),
                });
            }
        }
    }
    report
}

/// Mailer actor that owns the email sender.
///
/// Batches run on their own tasks so a slow provider never holds up the
/// mailbox.
pub struct MailerActor;

impl Actor for MailerActor {
    type Msg = MailerMessage;
    type State = MailerState;
    type Arguments = MailerArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting mailer");

        Ok(MailerState {
            sender: args.sender,
            send_timeout: args.send_timeout,
        })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let sender = state.sender.clone();
        let send_timeout = state.send_timeout;

        match message {
            MailerMessage::Broadcast { messages } => {
                if messages.is_empty() {
                    return Ok(());
                }
                tokio::spawn(async move {
                    let total = messages.len();
                    let report = deliver(sender, send_timeout, messages).await;
                    tracing::info!(
                        "Broadcast finished: {}/{} delivered",
                        report.sent,
                        total
                    );
                });
            }
            MailerMessage::Deliver { messages, reply } => {
                tokio::spawn(async move {
                    let report = deliver(sender, send_timeout, messages).await;
                    let _ = reply.send(report);
                });
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        _state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        tracing::info!("Mailer stopped");
        Ok(())
    }
}

/// Cloneable handle to a running mailer.
#[derive(Debug, Clone)]
pub struct Mailer {
    actor: ActorRef<MailerMessage>,
}

impl Mailer {
    /// Spawn a mailer actor around `sender`.
    pub async fn start(
        sender: Arc<dyn EmailSender>,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), SpawnErr> {
        Self::start_with(MailerArgs::new(sender)).await
    }

    pub async fn start_with(
        args: MailerArgs,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), SpawnErr> {
        // Unnamed, so several mailers can run side by side.
        let (actor, handle) = Actor::spawn(None, MailerActor, args).await?;
        Ok((Self { actor }, handle))
    }

    /// Queue a batch and return immediately.
    pub fn broadcast(&self, messages: Vec<EmailMessage>) {
        if let Err(e) = self
            .actor
            .send_message(MailerMessage::Broadcast { messages })
        {
            tracing::warn!("Mailer unavailable, dropping broadcast: {}", e);
        }
    }

    /// Deliver a batch and wait for the per-recipient outcome.
    pub async fn deliver(&self, messages: Vec<EmailMessage>) -> Result<DeliveryReport, MailError> {
        let (tx, rx) = ractor::concurrency::oneshot();
        self.actor
            .send_message(MailerMessage::Deliver {
                messages,
                reply: tx.into(),
            })
            .map_err(|e| MailError::Unavailable(format!("Failed to send message: {}", e)))?;

        rx.await
            .map_err(|_| MailError::Unavailable("Failed to receive response".into()))
    }

    pub fn stop(&self) {
        self.actor.stop(None);
    }
}
