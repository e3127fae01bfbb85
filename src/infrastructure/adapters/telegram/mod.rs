//! Telegram adapter

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use crate::application::errors::BotError;
use crate::application::messaging::MessageParser;
use crate::domain::entities::{BotCommand, ChatMessage};
use crate::domain::traits::{Bot, BotInfo, ParseMode};
use crate::infrastructure::config::TelegramConfig;

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<u16>,
    description: Option<String>,
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    base_url: String,
    client: Client,
    info: RwLock<BotInfo>,
    parser: MessageParser,
    offset: AtomicI64,
    poll_timeout: Duration,
    request_timeout: Duration,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>, config: &TelegramConfig) -> Self {
        Self {
            token: token.into(),
            base_url: API_BASE.to_string(),
            client: Client::new(),
            info: RwLock::new(BotInfo {
                id: "unknown".to_string(),
                name: "balanca-bot".to_string(),
                username: "balanca_bot".to_string(),
            }),
            parser: MessageParser::default(),
            offset: AtomicI64::new(0),
            poll_timeout: Duration::from_secs(config.poll_timeout_secs),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    fn masked_token(&self) -> String {
        let head: String = self.token.chars().take(8).collect();
        format!("{}...", head)
    }

    /// POST a Bot API method and unwrap its envelope
    async fn call<Req, Res>(&self, method: &str, request: &Req, timeout: Duration) -> Result<Res, BotError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let response = self.client
            .post(self.api_url(method))
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        parse_response(status, &body)
    }

    /// Fetch bot info from Telegram API. Also the cheapest way to find out
    /// whether the token is valid.
    pub async fn fetch_bot_info(&self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: Option<String>,
        }

        let data: BotInfoResponse = self
            .call("getMe", &serde_json::json!({}), self.request_timeout)
            .await?;

        let info = BotInfo {
            id: data.id.to_string(),
            name: data.first_name,
            username: data.username.unwrap_or_default(),
        };
        if let Ok(mut slot) = self.info.write() {
            *slot = info;
        }

        Ok(())
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: u64,
            allowed_updates: Vec<String>,
        }

        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: vec!["message".to_string()],
        };

        // The server holds the request for up to `timeout` seconds
        self.call("getUpdates", &request, self.poll_timeout + self.request_timeout)
            .await
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update]) -> Option<i64> {
        updates.iter().map(|u| u.update_id + 1).max()
    }

    fn to_chat_message(&self, update: &Update) -> Option<ChatMessage> {
        let msg = update.message.as_ref()?;
        let text = msg.text.as_deref()?;
        let sender = msg.from.as_ref().and_then(|u| {
            u.username.clone().or_else(|| u.first_name.clone())
        });
        Some(self.parser.parse(msg.chat.id.to_string(), text, sender))
    }

    /// Send a message with specific parse mode
    pub async fn send_message_with_format(&self, chat_id: &str, text: &str, parse_mode: ParseMode) -> Result<String, BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: &'a str,
            text: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            parse_mode: Option<&'static str>,
            #[serde(skip_serializing_if = "std::ops::Not::not")]
            disable_web_page_preview: bool,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            message_id: i64,
        }

        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: parse_mode.as_api_str(),
            disable_web_page_preview: parse_mode == ParseMode::MarkdownV2,
        };

        let data: MessageResult = self
            .call("sendMessage", &request, self.request_timeout)
            .await?;

        Ok(data.message_id.to_string())
    }

    /// Register bot commands with Telegram
    pub async fn register_commands(&self) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct Command {
            command: &'static str,
            description: &'static str,
        }

        #[derive(Serialize)]
        struct SetMyCommandsRequest {
            commands: Vec<Command>,
        }

        let commands = BotCommand::all()
            .iter()
            .map(|c| Command { command: c.name(), description: c.description() })
            .collect();

        let _: bool = self
            .call("setMyCommands", &SetMyCommandsRequest { commands }, self.request_timeout)
            .await?;

        tracing::info!("Registered bot commands with Telegram");
        Ok(())
    }
}

/// Map a Bot API answer to a result. 401 always means a bad token, whatever the body says.
fn parse_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, BotError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(BotError::Auth(format!("Telegram API error: {}", status)));
    }

    let envelope: ApiResponse<T> = serde_json::from_str(body).map_err(|e| {
        if status.is_success() {
            BotError::Parse(e.to_string())
        } else {
            BotError::Network(format!("Telegram API error: {}", status))
        }
    })?;

    if !envelope.ok {
        let code = envelope.error_code.unwrap_or(status.as_u16());
        let description = envelope.description.unwrap_or_else(|| status.to_string());
        if code == 401 {
            return Err(BotError::Auth(description));
        }
        return Err(BotError::Api { code, description });
    }

    envelope
        .result
        .ok_or_else(|| BotError::Parse("Telegram API response without result".to_string()))
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn start(&self) -> Result<(), BotError> {
        match self.fetch_bot_info().await {
            Ok(()) => tracing::info!("Bot started: @{}", self.bot_info().username),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => tracing::warn!(error = %e, "Failed to fetch bot info"),
        }

        if let Err(e) = self.register_commands().await {
            tracing::warn!("Failed to register commands: {}", e);
        }
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str, mode: ParseMode) -> Result<String, BotError> {
        tracing::debug!("Sending to {}: {}", chat_id, text);
        self.send_message_with_format(chat_id, text, mode).await
    }

    async fn next_messages(&self) -> Result<Vec<ChatMessage>, BotError> {
        let updates = self.get_updates(self.offset.load(Ordering::SeqCst)).await?;

        if let Some(next) = Self::get_next_offset(&updates) {
            self.offset.fetch_max(next, Ordering::SeqCst);
        }

        Ok(updates.iter().filter_map(|u| self.to_chat_message(u)).collect())
    }

    fn bot_info(&self) -> BotInfo {
        match self.info.read() {
            Ok(info) => info.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl std::fmt::Debug for TelegramAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramAdapter")
            .field("token", &self.masked_token())
            .field("base_url", &self.base_url)
            .field("info", &self.bot_info())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Content;

    fn adapter() -> TelegramAdapter {
        TelegramAdapter::new("123456789:secret", &TelegramConfig::default())
    }

    #[test]
    fn test_unauthorized_is_auth_error() {
        let body = r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#;
        let err = parse_response::<bool>(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert!(matches!(err, BotError::Auth(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_markdown_rejection_is_api_error() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: can't parse entities"}"#;
        let err = parse_response::<bool>(StatusCode::BAD_REQUEST, body).unwrap_err();
        match err {
            BotError::Api { code, description } => {
                assert_eq!(code, 400);
                assert!(description.contains("parse entities"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_json_failure_is_network_error() {
        let err = parse_response::<bool>(StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(matches!(err, BotError::Network(_)));
    }

    #[test]
    fn test_updates_become_chat_messages() {
        let body = r#"{"ok":true,"result":[
            {"update_id":10,"message":{"message_id":1,"chat":{"id":42},"from":{"id":7,"username":"ana"},"text":"/status"}},
            {"update_id":11,"message":{"message_id":2,"chat":{"id":42},"text":null}},
            {"update_id":12}
        ]}"#;
        let updates: Vec<Update> = parse_response(StatusCode::OK, body).unwrap();
        assert_eq!(TelegramAdapter::get_next_offset(&updates), Some(13));

        let adapter = adapter();
        let messages: Vec<ChatMessage> = updates.iter().filter_map(|u| adapter.to_chat_message(u)).collect();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].chat_id, "42");
        assert_eq!(messages[0].sender.as_deref(), Some("ana"));
        assert_eq!(messages[0].content.command_name(), Some("status"));
        assert!(matches!(messages[0].content, Content::Command { .. }));
    }

    #[test]
    fn test_no_updates_keeps_offset() {
        assert_eq!(TelegramAdapter::get_next_offset(&[]), None);
    }

    #[test]
    fn test_debug_masks_token() {
        let rendered = format!("{:?}", adapter());
        assert!(rendered.contains("12345678..."));
        assert!(!rendered.contains("secret"));
    }
}
