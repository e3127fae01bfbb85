/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
    Empty,
}

impl Content {
    pub fn command_name(&self) -> Option<&str> {
        match self {
            Content::Command { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A message typed by a chat user, as delivered by the chat transport.
///
/// Built by the adapter, handed to the dispatcher and dropped once handled.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub chat_id: String,
    pub sender: Option<String>,
    pub content: Content,
}

impl ChatMessage {
    pub fn new(chat_id: impl Into<String>, content: Content) -> Self {
        Self {
            chat_id: chat_id.into(),
            sender: None,
            content,
        }
    }

    pub fn from_text(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(chat_id, Content::Text(text.into()))
    }

    pub fn from_command(chat_id: impl Into<String>, name: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(chat_id, Content::Command { name: name.into(), args })
    }

    pub fn with_sender_opt(mut self, sender: Option<String>) -> Self {
        self.sender = sender;
        self
    }
}
