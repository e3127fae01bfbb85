//! Lifecycle and data events coming from the MQTT side.

/// One event delivered by the broker connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerEvent {
    /// The broker accepted the connection
    Connected,
    /// Every requested topic subscription was granted
    Subscribed,
    /// The broker refused at least one topic subscription
    SubscribeFailed(String),
    /// A publish arrived on a subscribed topic
    Message(TopicMessage),
    /// The connection failed or dropped
    Error(String),
}

/// A payload received on an MQTT topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMessage {
    pub topic: String,
    pub payload: String,
}

impl TopicMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Builds a message from raw bytes; invalid UTF-8 is replaced rather than rejected.
    pub fn from_bytes(topic: impl Into<String>, payload: &[u8]) -> Self {
        Self::new(topic, String::from_utf8_lossy(payload).into_owned())
    }
}
