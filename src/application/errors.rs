//! Application layer errors

use thiserror::Error;

/// Chat transport errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Network error: {0}")]
    Network(String),

    /// The Bot API rejected the token (HTTP 401). Nothing useful can be done
    /// after this, callers treat it as fatal.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The Bot API answered `ok: false`, e.g. a MarkdownV2 entity it could not parse.
    #[error("Telegram API error {code}: {description}")]
    Api { code: u16, description: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, BotError::Auth(_))
    }
}

/// MQTT transport errors
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Client error: {0}")]
    Client(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid broker URL: {0}")]
    InvalidUrl(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
