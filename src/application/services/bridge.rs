//! Bridge lifecycle
//!
//! Starts the chat transport, brings up the broker and runs both loops until
//! an interrupt arrives or the chat side fails for good.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::application::errors::{BotError, BrokerError};
use crate::application::messaging::{run_polling, MessageDispatcher};
use crate::application::services::{NotificationRouter, RouteConfig};
use crate::domain::traits::{Bot, Broker};

/// How a bridge run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Stopped by an interrupt after closing the broker connection
    Interrupted,
    /// The chat transport rejected the bot token
    AuthFailed,
    /// Anything else that ended the run early
    Failed,
}

impl ExitStatus {
    /// Process exit code
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Interrupted => 0,
            ExitStatus::AuthFailed | ExitStatus::Failed => 1,
        }
    }
}

pub struct Bridge {
    bot: Arc<dyn Bot>,
    routes: RouteConfig,
    retry_delay: Duration,
}

impl Bridge {
    pub fn new(bot: Arc<dyn Bot>, routes: RouteConfig, retry_delay: Duration) -> Self {
        Self { bot, routes, retry_delay }
    }

    /// Run until `interrupt` resolves or chat polling stops.
    ///
    /// `connect` is only called once the bot has started, and yields the
    /// broker plus a function that drives its events. On interrupt the broker
    /// is disconnected once and both loops are drained. When polling stops on
    /// its own the broker loop is aborted without a disconnect.
    pub async fn run<C, E, F, I>(&self, connect: C, interrupt: I) -> ExitStatus
    where
        C: FnOnce() -> Result<(Arc<dyn Broker>, E), BrokerError>,
        E: FnOnce(Arc<NotificationRouter>, CancellationToken) -> F,
        F: Future<Output = ()> + Send + 'static,
        I: Future<Output = ()>,
    {
        if let Err(e) = self.bot.start().await {
            if e.is_fatal() {
                tracing::error!(error = %e, "Invalid Telegram token. Check TELEGRAM_TOKEN");
                return ExitStatus::AuthFailed;
            }
            tracing::warn!(error = %e, "Bot started with errors");
        }

        let (broker, events) = match connect() {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!("Failed to set up MQTT client: {}", e);
                return ExitStatus::Failed;
            }
        };

        let router = Arc::new(NotificationRouter::new(
            Arc::clone(&self.bot),
            Arc::clone(&broker),
            self.routes.clone(),
        ));
        let dispatcher = Arc::new(MessageDispatcher::new(Arc::clone(&router)));
        let shutdown = CancellationToken::new();

        let mut broker_task = tokio::spawn(events(router, shutdown.clone()));
        let mut chat_task = tokio::spawn(run_polling(
            Arc::clone(&self.bot),
            dispatcher,
            shutdown.clone(),
            self.retry_delay,
        ));

        tracing::info!("Bot started. Waiting for commands...");
        tokio::pin!(interrupt);

        tokio::select! {
            _ = &mut interrupt => {
                tracing::info!("Shutting down...");
                if let Err(e) = broker.disconnect().await {
                    tracing::error!("Failed to close MQTT connection: {}", e);
                }
                shutdown.cancel();
                let _ = (&mut broker_task).await;
                let _ = (&mut chat_task).await;
                ExitStatus::Interrupted
            }
            result = &mut chat_task => {
                broker_task.abort();
                let _ = broker_task.await;
                exit_status(result)
            }
        }
    }
}

fn exit_status(result: Result<Result<(), BotError>, tokio::task::JoinError>) -> ExitStatus {
    match result {
        Ok(Ok(())) => ExitStatus::Interrupted,
        Ok(Err(e)) if e.is_fatal() => {
            tracing::error!(error = %e, "Invalid Telegram token. Check TELEGRAM_TOKEN");
            ExitStatus::AuthFailed
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Chat polling stopped");
            ExitStatus::Failed
        }
        Err(e) => {
            tracing::error!("Chat polling task failed: {}", e);
            ExitStatus::Failed
        }
    }
}

/// Resolve when `signal` reports an interrupt.
///
/// If the listener itself fails the error is logged and this never resolves,
/// leaving the other shutdown paths in charge.
pub async fn until_interrupted<S>(signal: S)
where
    S: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!("Failed to listen for interrupt: {}", e);
        std::future::pending::<()>().await;
    }
}
