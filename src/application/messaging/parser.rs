//! Message parser - Parses raw chat text into structured messages

use crate::domain::entities::{ChatMessage, Content};

/// Parses incoming chat text into [`ChatMessage`]s
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse a text message
    pub fn parse(&self, chat_id: impl Into<String>, text: impl Into<String>, sender: Option<String>) -> ChatMessage {
        let text = text.into();
        let chat_id = chat_id.into();

        if text.trim().is_empty() {
            return ChatMessage::new(chat_id, Content::Empty).with_sender_opt(sender);
        }

        if text.starts_with(&self.command_prefix) {
            return self.parse_command(chat_id, &text, sender);
        }

        ChatMessage::new(chat_id, Content::Text(text)).with_sender_opt(sender)
    }

    /// Parse a command message. In group chats Telegram appends the bot's
    /// username (`/status@balanca_bot`), which is dropped here.
    fn parse_command(&self, chat_id: String, text: &str, sender: Option<String>) -> ChatMessage {
        let cmd_text = &text[self.command_prefix.len()..];

        let mut parts = cmd_text.split_whitespace();
        let head = parts.next().unwrap_or("");
        let name = head.split('@').next().unwrap_or("").to_lowercase();
        let args = parts.map(|s| s.to_string()).collect();

        ChatMessage::new(chat_id, Content::Command { name, args }).with_sender_opt(sender)
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new("/")
    }
}
