//! Console adapter for development/testing
//!
//! Used when no Telegram token is configured: notifications are printed and
//! commands are read from stdin, one per line.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::application::errors::BotError;
use crate::application::messaging::MessageParser;
use crate::domain::entities::ChatMessage;
use crate::domain::traits::{Bot, BotInfo, ParseMode};

pub const CONSOLE_CHAT_ID: &str = "console";

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    parser: MessageParser,
    input: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "balanca-bot".to_string(),
                username: "console".to_string(),
            },
            parser: MessageParser::default(),
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Console bot started. Type /start or /status");
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str, mode: ParseMode) -> Result<String, BotError> {
        match mode {
            ParseMode::MarkdownV2 => println!("[BOT -> {}] (markdown) {}", chat_id, text),
            ParseMode::Plain => println!("[BOT -> {}] {}", chat_id, text),
        }
        Ok("console_msg".to_string())
    }

    async fn next_messages(&self) -> Result<Vec<ChatMessage>, BotError> {
        let mut input = self.input.lock().await;
        match input.next_line().await {
            Ok(Some(line)) => Ok(vec![self.parser.parse(CONSOLE_CHAT_ID, line.trim(), None)]),
            Ok(None) => {
                // stdin closed; park instead of spinning on EOF
                drop(input);
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
            Err(e) => Err(BotError::Internal(format!("Failed to read stdin: {}", e))),
        }
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
