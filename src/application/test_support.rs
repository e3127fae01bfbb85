//! Recording transports for unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::errors::{BotError, BrokerError};
use crate::application::services::RouteConfig;
use crate::domain::entities::ChatMessage;
use crate::domain::traits::{Bot, BotInfo, Broker, ParseMode, Qos};

pub fn routes(chat_id: Option<&str>) -> RouteConfig {
    RouteConfig {
        chat_id: chat_id.map(|s| s.to_string()),
        weight_topic: "balanca/peso".to_string(),
        status_topic: "balanca/status".to_string(),
        status_request: "Solicitação de status".to_string(),
    }
}

/// One recorded `send_message` call, failed or not
#[derive(Debug, Clone)]
pub struct SentRecord {
    pub chat_id: String,
    pub text: String,
    pub mode: ParseMode,
}

/// Bot that records sends and replays scripted polling results
#[derive(Default)]
pub struct MockBot {
    sent: Mutex<Vec<SentRecord>>,
    batches: Mutex<VecDeque<Result<Vec<ChatMessage>, BotError>>>,
    polls: AtomicUsize,
    start_error: Mutex<Option<BotError>>,
    send_delay: Option<Duration>,
    fail_markdown: bool,
    fail_plain: bool,
}

impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `start` fail once with `error`
    pub fn fail_start(self, error: BotError) -> Self {
        *self.start_error.lock().unwrap() = Some(error);
        self
    }

    /// Hold every send for `delay` after recording it
    pub fn send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = Some(delay);
        self
    }

    pub fn fail_markdown(mut self) -> Self {
        self.fail_markdown = true;
        self
    }

    pub fn fail_plain(mut self) -> Self {
        self.fail_plain = true;
        self
    }

    /// Queue a result for the next `next_messages` call
    pub fn push_batch(&self, batch: Result<Vec<ChatMessage>, BotError>) {
        self.batches.lock().unwrap().push_back(batch);
    }

    pub fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().unwrap().clone()
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn start(&self) -> Result<(), BotError> {
        match self.start_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn send_message(&self, chat_id: &str, text: &str, mode: ParseMode) -> Result<String, BotError> {
        self.sent.lock().unwrap().push(SentRecord {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            mode,
        });
        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }
        let fail = match mode {
            ParseMode::MarkdownV2 => self.fail_markdown,
            ParseMode::Plain => self.fail_plain,
        };
        if fail {
            return Err(BotError::Api {
                code: 400,
                description: "Bad Request: can't parse entities".to_string(),
            });
        }
        Ok("1".to_string())
    }

    async fn next_messages(&self) -> Result<Vec<ChatMessage>, BotError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                // Behave like an idle long poll
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(Vec::new())
            }
        }
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: "1".to_string(),
            name: "mock".to_string(),
            username: "mock_bot".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRecord {
    pub topic: String,
    pub payload: String,
    pub qos: Qos,
}

/// Broker that records every call
#[derive(Default)]
pub struct MockBroker {
    published: Mutex<Vec<PublishRecord>>,
    subscriptions: Mutex<Vec<Vec<String>>>,
    disconnects: AtomicUsize,
    fail_publish: bool,
}

impl MockBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_publish(mut self) -> Self {
        self.fail_publish = true;
        self
    }

    pub fn published(&self) -> Vec<PublishRecord> {
        self.published.lock().unwrap().clone()
    }

    pub fn subscriptions(&self) -> Vec<Vec<String>> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Broker for MockBroker {
    async fn subscribe(&self, topics: &[String], _qos: Qos) -> Result<(), BrokerError> {
        self.subscriptions.lock().unwrap().push(topics.to_vec());
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &str, qos: Qos) -> Result<(), BrokerError> {
        self.published.lock().unwrap().push(PublishRecord {
            topic: topic.to_string(),
            payload: payload.to_string(),
            qos,
        });
        if self.fail_publish {
            return Err(BrokerError::Client("request channel closed".to_string()));
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), BrokerError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
