//! Recording transports shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use balanca_bot::application::errors::{BotError, BrokerError};
use balanca_bot::domain::entities::ChatMessage;
use balanca_bot::domain::traits::{Bot, BotInfo, Broker, ParseMode, Qos};

/// One recorded `send_message` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    pub chat_id: String,
    pub text: String,
    pub mode: ParseMode,
}

/// Bot that records sends and replays queued polling results
#[derive(Default)]
pub struct MockBot {
    sent: Mutex<Vec<SentRecord>>,
    batches: Mutex<VecDeque<Result<Vec<ChatMessage>, BotError>>>,
    polls: AtomicUsize,
}

impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for the next `next_messages` call
    pub fn push_batch(&self, batch: Result<Vec<ChatMessage>, BotError>) {
        self.batches.lock().unwrap().push_back(batch);
    }

    pub fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|r| r.text).collect()
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn start(&self) -> Result<(), BotError> {
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str, mode: ParseMode) -> Result<String, BotError> {
        self.sent.lock().unwrap().push(SentRecord {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            mode,
        });
        Ok("1".to_string())
    }

    async fn next_messages(&self) -> Result<Vec<ChatMessage>, BotError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
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
}

impl MockBroker {
    pub fn new() -> Self {
        Self::default()
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
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), BrokerError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
