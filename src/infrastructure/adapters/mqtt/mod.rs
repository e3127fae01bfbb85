//! MQTT adapter
//!
//! Wraps a rumqttc [`AsyncClient`] behind the [`Broker`] trait and drives its
//! [`EventLoop`], translating packets into [`BrokerEvent`]s for the router.

use async_trait::async_trait;
use rumqttc::{
    AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
    SubscribeFilter, SubscribeReasonCode, Transport,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::errors::BrokerError;
use crate::application::services::NotificationRouter;
use crate::domain::entities::{BrokerEvent, TopicMessage};
use crate::domain::traits::{Broker, Qos};
use crate::infrastructure::config::MqttConfig;

/// Capacity of the client -> event loop request channel
const REQUEST_CAPACITY: usize = 100;

/// How long shutdown waits for the DISCONNECT packet to leave
const DISCONNECT_GRACE: Duration = Duration::from_secs(2);

/// Where and how to reach the broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

/// Parse a broker URL such as `mqtts://host`, `tcp://host:1883` or `host`.
///
/// A port inside the URL wins over `default_port`. TLS is chosen by the
/// `mqtts`/`ssl` schemes or by port 8883, unless `tls` forces it.
pub fn parse_broker_url(url: &str, default_port: u16, tls: Option<bool>) -> Result<BrokerAddress, BrokerError> {
    let url = url.trim();
    let (rest, scheme_tls) = match url.split_once("://") {
        Some(("mqtt" | "tcp", rest)) => (rest, false),
        Some(("mqtts" | "ssl" | "tls", rest)) => (rest, true),
        Some((scheme, _)) => {
            return Err(BrokerError::InvalidUrl(format!("unsupported scheme: {}", scheme)))
        }
        None => (url, false),
    };

    let authority = rest.split('/').next().unwrap_or("");
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| BrokerError::InvalidUrl(format!("invalid port in broker URL: {}", port)))?;
            (host, port)
        }
        None => (authority, default_port),
    };

    if host.is_empty() {
        return Err(BrokerError::InvalidUrl(format!("missing host: {}", url)));
    }

    Ok(BrokerAddress {
        host: host.to_string(),
        port,
        tls: tls.unwrap_or(scheme_tls || port == 8883),
    })
}

fn to_qos(qos: Qos) -> QoS {
    match qos {
        Qos::AtMostOnce => QoS::AtMostOnce,
        Qos::AtLeastOnce => QoS::AtLeastOnce,
    }
}

/// MQTT broker adapter
pub struct MqttAdapter {
    client: AsyncClient,
    closed: AtomicBool,
}

impl MqttAdapter {
    /// Build the client and its event loop. Nothing touches the network
    /// until the event loop is polled.
    pub fn connect(config: &MqttConfig) -> Result<(Self, EventLoop), BrokerError> {
        let address = parse_broker_url(&config.url, config.port, config.tls)?;

        let client_id = format!("{}-{}", config.client_id, std::process::id());
        let mut mqtt_options = MqttOptions::new(client_id, address.host.clone(), address.port);
        mqtt_options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.max(5)));
        mqtt_options.set_clean_session(true);

        if let Some(username) = &config.username {
            mqtt_options.set_credentials(username.clone(), config.password.clone().unwrap_or_default());
        }
        if address.tls {
            mqtt_options.set_transport(Transport::tls_with_default_config());
        }

        tracing::info!(
            host = %address.host,
            port = address.port,
            tls = address.tls,
            "Connecting to MQTT broker..."
        );

        let (client, eventloop) = AsyncClient::new(mqtt_options, REQUEST_CAPACITY);
        Ok((Self { client, closed: AtomicBool::new(false) }, eventloop))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Broker for MqttAdapter {
    async fn subscribe(&self, topics: &[String], qos: Qos) -> Result<(), BrokerError> {
        let filters = topics
            .iter()
            .map(|t| SubscribeFilter::new(t.clone(), to_qos(qos)));
        self.client
            .subscribe_many(filters)
            .await
            .map_err(|e| BrokerError::Client(e.to_string()))
    }

    async fn publish(&self, topic: &str, payload: &str, qos: Qos) -> Result<(), BrokerError> {
        if self.is_closed() {
            return Err(BrokerError::Connection("connection closed".to_string()));
        }
        self.client
            .publish(topic, to_qos(qos), false, payload.as_bytes().to_vec())
            .await
            .map_err(|e| BrokerError::Client(e.to_string()))
    }

    async fn disconnect(&self) -> Result<(), BrokerError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::info!("Closing MQTT connection");
        self.client
            .disconnect()
            .await
            .map_err(|e| BrokerError::Client(e.to_string()))
    }
}

/// Translate a rumqttc event into what the router cares about
pub fn translate(event: &Event) -> Option<BrokerEvent> {
    match event {
        // rumqttc only yields a successful ConnAck; refusals come back from poll() as errors
        Event::Incoming(Packet::ConnAck(_)) => Some(BrokerEvent::Connected),
        Event::Incoming(Packet::SubAck(ack)) => {
            let refused = ack
                .return_codes
                .iter()
                .filter(|c| matches!(c, SubscribeReasonCode::Failure))
                .count();
            if refused == 0 {
                Some(BrokerEvent::Subscribed)
            } else {
                Some(BrokerEvent::SubscribeFailed(format!(
                    "{} of {} subscriptions refused",
                    refused,
                    ack.return_codes.len()
                )))
            }
        }
        Event::Incoming(Packet::Publish(publish)) => Some(BrokerEvent::Message(
            TopicMessage::from_bytes(publish.topic.clone(), &publish.payload),
        )),
        _ => None,
    }
}

/// Poll the broker connection until shutdown or the first connection error.
///
/// Each event is handled on its own task. A connection error is forwarded and
/// ends the loop; no reconnect is attempted.
pub async fn run_event_loop(
    mut eventloop: EventLoop,
    router: Arc<NotificationRouter>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                flush_disconnect(&mut eventloop).await;
                return;
            }
            event = eventloop.poll() => match event {
                Ok(event) => {
                    let Some(event) = translate(&event) else { continue };
                    let router = Arc::clone(&router);
                    tokio::spawn(async move {
                        router.handle_broker_event(event).await;
                    });
                }
                Err(e) => {
                    if shutdown.is_cancelled() {
                        return;
                    }
                    router.handle_broker_event(BrokerEvent::Error(e.to_string())).await;
                    tracing::warn!("MQTT event loop stopped, not reconnecting");
                    return;
                }
            }
        }
    }
}

/// Keep polling until the queued DISCONNECT has gone out
async fn flush_disconnect(eventloop: &mut EventLoop) {
    let flushed = tokio::time::timeout(DISCONNECT_GRACE, async {
        loop {
            match eventloop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    })
    .await;

    if flushed.is_err() {
        tracing::warn!("Timed out waiting for MQTT disconnect");
    }
}
