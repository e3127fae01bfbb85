//! Message dispatcher - Routes chat messages to the notification router

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::errors::BotError;
use crate::application::services::NotificationRouter;
use crate::domain::entities::{BotCommand, ChatMessage, Content};
use crate::domain::traits::Bot;

/// Turns inbound chat messages into router calls
pub struct MessageDispatcher {
    router: Arc<NotificationRouter>,
}

impl MessageDispatcher {
    pub fn new(router: Arc<NotificationRouter>) -> Self {
        Self { router }
    }

    /// Handle one message on its own task. Returns `None` when there was
    /// nothing to do (plain text, unknown commands).
    pub fn dispatch(&self, message: ChatMessage) -> Option<JoinHandle<()>> {
        let Content::Command { name, .. } = &message.content else {
            tracing::debug!(chat_id = %message.chat_id, "Ignoring non-command message");
            return None;
        };

        let Some(command) = BotCommand::from_name(name) else {
            tracing::debug!(chat_id = %message.chat_id, command = %name, "Ignoring unknown command");
            return None;
        };

        let router = Arc::clone(&self.router);
        let chat_id = message.chat_id;
        Some(tokio::spawn(async move {
            router.handle_command(command, &chat_id).await;
        }))
    }
}

/// Long-poll the chat transport until shutdown.
///
/// Non-fatal polling errors are logged and retried after `retry_delay`.
/// An authentication failure ends the loop with that error.
pub async fn run_polling(
    bot: Arc<dyn Bot>,
    dispatcher: Arc<MessageDispatcher>,
    shutdown: CancellationToken,
    retry_delay: Duration,
) -> Result<(), BotError> {
    tracing::info!("Starting message loop...");

    loop {
        let result = tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!("Chat polling stopped");
                return Ok(());
            }
            result = bot.next_messages() => result,
        };

        match result {
            Ok(messages) => {
                if !messages.is_empty() {
                    tracing::debug!("Received {} updates", messages.len());
                }
                for message in messages {
                    dispatcher.dispatch(message);
                }
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, "Telegram rejected the bot token");
                return Err(e);
            }
            Err(e) => {
                tracing::error!(error = %e, "Telegram polling error");
                tokio::select! {
                    _ = shutdown.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(retry_delay) => {}
                }
            }
        }
    }
}
