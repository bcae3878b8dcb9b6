//! Outbound "contact the owner" channel.
//!
//! Only a mock exists: [`MockContactChannel`] logs the message and keeps it in
//! memory. No message is ever sent anywhere.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub body: String,
    pub reply_to: Option<String>,
}

#[derive(Debug, Error)]
#[error("contact channel unavailable: {0}")]
pub struct ContactError(pub String);

#[async_trait]
pub trait ContactChannel: Send + Sync {
    /// Display name of whoever receives the message.
    fn recipient(&self) -> &str;

    async fn deliver(&self, message: &ContactMessage) -> Result<(), ContactError>;
}

pub struct MockContactChannel {
    recipient: String,
    delivered: Mutex<Vec<ContactMessage>>,
}

impl MockContactChannel {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn delivered(&self) -> Vec<ContactMessage> {
        self.delivered
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ContactChannel for MockContactChannel {
    fn recipient(&self) -> &str {
        &self.recipient
    }

    async fn deliver(&self, message: &ContactMessage) -> Result<(), ContactError> {
        info!(
            target: "contact_mock",
            recipient = %self.recipient,
            reply_to = message.reply_to.as_deref().unwrap_or("-"),
            body = %message.body,
            "Mock delivery, message not sent"
        );
        self.delivered
            .lock()
            .map_err(|_| ContactError("mock outbox poisoned".to_string()))?
            .push(message.clone());
        Ok(())
    }
}
