use async_trait::async_trait;
use crate::application::errors::BrokerError;

/// MQTT delivery guarantee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qos {
    AtMostOnce,
    AtLeastOnce,
}

/// Broker trait - abstraction for the MQTT transport
#[async_trait]
pub trait Broker: Send + Sync {
    /// Request subscriptions; the outcome arrives later as a broker event
    async fn subscribe(&self, topics: &[String], qos: Qos) -> Result<(), BrokerError>;

    /// Queue a publish
    async fn publish(&self, topic: &str, payload: &str, qos: Qos) -> Result<(), BrokerError>;

    /// Close the connection. Calls after the first are no-ops.
    async fn disconnect(&self) -> Result<(), BrokerError>;
}
