mod telegram;

use crate::repos::lock;
use std::sync::Mutex;
pub use telegram::TelegramNotifier;
use thiserror::Error;
use tracing::info;

/// A chat message with an optional reply keyboard
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    /// Rows of button labels. `None` keeps whatever keyboard the chat shows
    pub keyboard: Option<Vec<Vec<String>>>,
}

impl OutgoingMessage {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, rows: &[&[&str]]) -> Self {
        self.keyboard = Some(
            rows.iter()
                .map(|row| row.iter().map(|label| label.to_string()).collect())
                .collect(),
        );
        self
    }
}

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("Could not reach the chat api: {0}")]
    Network(String),
    #[error("Chat api rejected the message: {0}")]
    Rejected(String),
}

/// Delivers messages to a chat
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), NotifierError>;
}

/// Used when no bot token is configured
pub struct LogNotifier {}

#[async_trait::async_trait]
impl INotifier for LogNotifier {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), NotifierError> {
        info!("Message to chat {}: {}", message.chat_id, message.text);
        Ok(())
    }
}

/// Records messages instead of sending them
#[derive(Default)]
pub struct InMemoryNotifier {
    sent: Mutex<Vec<OutgoingMessage>>,
    failing: Mutex<bool>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        lock(&self.sent).clone()
    }

    /// Makes every following send fail until reset
    pub fn set_failing(&self, failing: bool) {
        *lock(&self.failing) = failing;
    }
}

#[async_trait::async_trait]
impl INotifier for InMemoryNotifier {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), NotifierError> {
        if *lock(&self.failing) {
            return Err(NotifierError::Network("chat is unreachable".into()));
        }
        lock(&self.sent).push(message.clone());
        Ok(())
    }
}
