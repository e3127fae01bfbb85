use async_trait::async_trait;
use crate::domain::entities::ChatMessage;
use crate::application::errors::BotError;

/// How the chat transport should interpret outgoing text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Telegram MarkdownV2; reserved characters must already be escaped
    MarkdownV2,
    /// Sent verbatim
    Plain,
}

impl ParseMode {
    pub fn as_api_str(&self) -> Option<&'static str> {
        match self {
            ParseMode::MarkdownV2 => Some("MarkdownV2"),
            ParseMode::Plain => None,
        }
    }
}

/// Bot trait - abstraction for the chat transport
#[async_trait]
pub trait Bot: Send + Sync {
    /// Prepare the transport before any traffic flows. An authentication
    /// failure here is fatal.
    async fn start(&self) -> Result<(), BotError>;

    /// Send a message to a chat, returning the transport's message id
    async fn send_message(&self, chat_id: &str, text: &str, mode: ParseMode) -> Result<String, BotError>;

    /// Wait for the next batch of inbound messages.
    ///
    /// Returns an empty batch when the wait timed out with nothing to deliver.
    async fn next_messages(&self) -> Result<Vec<ChatMessage>, BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
