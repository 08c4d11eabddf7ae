//! Outbound message queue and the sender capability.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::EngineError;

/// One outbound message: destination id (E.164 digits, no leading '+') and
/// text. Commands queue these under the tenant lock; the caller delivers
/// them after the lock is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: String,
    pub text: String,
}

impl Outbound {
    /// Create an outbound message.
    pub fn new(to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            text: text.into(),
        }
    }
}

/// Trait for the outbound send capability.
///
/// Abstracted to support different transports (the WhatsApp gateway, tests).
#[async_trait]
pub trait OutboundSender: Send + Sync {
    /// Send a text message to one recipient.
    async fn send(&self, to: &str, text: &str) -> Result<(), EngineError>;
}

/// A no-op sender for testing that discards all messages.
#[derive(Debug, Clone, Default)]
pub struct NoOpSender;

#[async_trait]
impl OutboundSender for NoOpSender {
    async fn send(&self, _to: &str, _text: &str) -> Result<(), EngineError> {
        Ok(())
    }
}

/// A logging sender for debugging that logs all operations.
#[derive(Debug, Clone, Default)]
pub struct LoggingSender;

#[async_trait]
impl OutboundSender for LoggingSender {
    async fn send(&self, to: &str, text: &str) -> Result<(), EngineError> {
        info!(to = %to, "Sending: {}", text);
        Ok(())
    }
}

/// Counters for a delivered batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub ok: usize,
    pub fail: usize,
}

/// Deliver a batch of outbound messages, counting successes and failures.
///
/// State is already persisted when this runs, so a failed send is logged
/// and reported but never reverts anything.
pub async fn deliver<S>(sender: &S, messages: &[Outbound]) -> DeliveryReport
where
    S: OutboundSender + ?Sized,
{
    let mut report = DeliveryReport::default();
    for message in messages {
        match sender.send(&message.to, &message.text).await {
            Ok(()) => report.ok += 1,
            Err(err) => {
                report.fail += 1;
                warn!(to = %message.to, error = %err, "Outbound send failed");
            }
        }
    }
    report
}
