//! Routes broker events to the chat and chat commands to the broker.
//!
//! The router holds no mutable state. Every public entry point absorbs its own
//! failures: a transport error is logged where it happens and never reaches
//! the caller, so one bad message cannot stop the event loops feeding it.

use std::sync::Arc;

use crate::application::messaging::format::{
    self, broker_error_message, escape_markdown, status_message, weight_message,
};
use crate::domain::entities::{BotCommand, BrokerEvent, TopicMessage};
use crate::domain::traits::{Bot, Broker, ParseMode, Qos};

/// What the router needs to know about its surroundings, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    /// Destination for notifications. `None` drops them with a log line.
    pub chat_id: Option<String>,
    pub weight_topic: String,
    pub status_topic: String,
    /// Payload published on the status topic by `/status`
    pub status_request: String,
}

impl RouteConfig {
    pub fn topics(&self) -> Vec<String> {
        vec![self.weight_topic.clone(), self.status_topic.clone()]
    }
}

/// Which configured channel a topic belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    Weight,
    Status,
}

pub struct NotificationRouter {
    bot: Arc<dyn Bot>,
    broker: Arc<dyn Broker>,
    routes: RouteConfig,
}

impl NotificationRouter {
    pub fn new(bot: Arc<dyn Bot>, broker: Arc<dyn Broker>, routes: RouteConfig) -> Self {
        Self { bot, broker, routes }
    }

    pub fn routes(&self) -> &RouteConfig {
        &self.routes
    }

    /// Anything that is not the status topic is read as a weight.
    pub fn classify(&self, topic: &str) -> TopicKind {
        if topic == self.routes.status_topic {
            TopicKind::Status
        } else {
            TopicKind::Weight
        }
    }

    pub fn format(&self, topic: &str, payload: &str) -> String {
        match self.classify(topic) {
            TopicKind::Status => status_message(payload),
            TopicKind::Weight => weight_message(payload),
        }
    }

    /// Format an MQTT payload and forward it to the configured chat
    pub async fn format_and_forward(&self, message: &TopicMessage) {
        tracing::info!(topic = %message.topic, payload = %message.payload, "[MQTT] message received");

        let text = self.format(&message.topic, &message.payload);
        self.notify(&text).await;
    }

    /// Send to the configured chat, or log and drop when there is none
    async fn notify(&self, text: &str) {
        match &self.routes.chat_id {
            Some(chat_id) => self.send_safely(chat_id, text).await,
            None => tracing::info!("CHAT_ID not configured, notification dropped"),
        }
    }

    /// Send `text` as MarkdownV2 with every reserved character escaped. If
    /// that is rejected, send the original text once more as plain text. A
    /// failed fallback is logged and swallowed.
    pub async fn send_safely(&self, chat_id: &str, text: &str) {
        let escaped = escape_markdown(text);
        let Err(e) = self.bot.send_message(chat_id, &escaped, ParseMode::MarkdownV2).await else {
            return;
        };
        tracing::warn!(chat_id = %chat_id, error = %e, "Markdown send failed, falling back to plain text");

        if let Err(e) = self.bot.send_message(chat_id, text, ParseMode::Plain).await {
            tracing::error!(chat_id = %chat_id, error = %e, "Plain text fallback failed, message dropped");
        }
    }

    /// Answer a chat command
    pub async fn handle_command(&self, command: BotCommand, chat_id: &str) {
        tracing::info!(command = %command, chat_id = %chat_id, "Handling command");

        match command {
            BotCommand::Start => self.send_safely(chat_id, format::WELCOME_MESSAGE).await,
            BotCommand::Status => {
                // The reply comes back later as an ordinary message on the status topic.
                if let Err(e) = self
                    .broker
                    .publish(&self.routes.status_topic, &self.routes.status_request, Qos::AtLeastOnce)
                    .await
                {
                    tracing::error!(topic = %self.routes.status_topic, error = %e, "Failed to publish status request");
                }
            }
        }
    }

    /// React to a broker lifecycle or data event
    pub async fn handle_broker_event(&self, event: BrokerEvent) {
        match event {
            BrokerEvent::Connected => {
                tracing::info!("Connected to MQTT broker");
                let topics = self.routes.topics();
                if let Err(e) = self.broker.subscribe(&topics, Qos::AtMostOnce).await {
                    tracing::error!(error = %e, "Failed to subscribe to topics");
                }
            }
            BrokerEvent::Subscribed => {
                tracing::info!(
                    weight = %self.routes.weight_topic,
                    status = %self.routes.status_topic,
                    "Subscribed to topics"
                );
                if self.routes.chat_id.is_some() {
                    self.notify(format::CONNECTED_MESSAGE).await;
                }
            }
            BrokerEvent::SubscribeFailed(reason) => {
                tracing::error!(reason = %reason, "Failed to subscribe to topics");
            }
            BrokerEvent::Message(message) => self.format_and_forward(&message).await,
            BrokerEvent::Error(error) => {
                tracing::error!(error = %error, "MQTT connection error");
                if self.routes.chat_id.is_some() {
                    self.notify(&broker_error_message(&error)).await;
                }
            }
        }
    }
}
