use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use balanca_bot::application::errors::{BrokerError, ConfigError};
use balanca_bot::application::services::{until_interrupted, Bridge, NotificationRouter};
use balanca_bot::domain::traits::{Bot, Broker};
use balanca_bot::infrastructure::adapters::mqtt::{run_event_loop, MqttAdapter};
use balanca_bot::infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use balanca_bot::infrastructure::config::Config;

#[derive(Parser)]
#[command(name = "balanca-bot")]
#[command(about = "Forwards scale readings from MQTT to a Telegram chat", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config and TELEGRAM_TOKEN)
    #[arg(short, long)]
    token: Option<String>,

    /// Destination chat (overrides config and CHAT_ID)
    #[arg(long)]
    chat_id: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bridge
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            let code = run_bridge(&cli.config, cli.token, cli.chat_id);
            std::process::exit(code);
        }
        Commands::Version => {
            println!("balanca-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            if let Err(e) = init_config(&cli.config) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
    }
}

fn load_config(path: &str, token: Option<String>, chat_id: Option<String>) -> Result<Config, ConfigError> {
    let mut config = if Path::new(path).exists() {
        Config::load(path)?
    } else {
        tracing::debug!("{} not found, using defaults", path);
        Config::default()
    };

    config.apply_env(|key| std::env::var(key).ok())?;

    config.apply_overrides(token, chat_id);

    config.validate()?;
    Ok(config)
}

fn run_bridge(config_path: &str, token: Option<String>, chat_id: Option<String>) -> i32 {
    let config = match load_config(config_path, token, chat_id) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return 1;
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return 1;
        }
    };

    let code = rt.block_on(serve(config));
    // stdin reads in console mode sit on a blocking thread; don't wait for them
    rt.shutdown_background();
    code
}

fn chat_transport(config: &Config) -> Arc<dyn Bot> {
    match config.telegram_token() {
        Some(token) => Arc::new(TelegramAdapter::new(token, &config.telegram)),
        None => {
            tracing::warn!("TELEGRAM_TOKEN not set, running console bot (dev mode)");
            Arc::new(ConsoleAdapter::new())
        }
    }
}

async fn serve(config: Config) -> i32 {
    let bridge = Bridge::new(
        chat_transport(&config),
        config.routes(),
        Duration::from_secs(config.telegram.retry_delay_secs),
    );

    let status = bridge
        .run(
            || -> Result<_, BrokerError> {
                let (adapter, eventloop) = MqttAdapter::connect(&config.mqtt)?;
                let broker: Arc<dyn Broker> = Arc::new(adapter);
                let events = move |router: Arc<NotificationRouter>, shutdown: CancellationToken| {
                    run_event_loop(eventloop, router, shutdown)
                };
                Ok((broker, events))
            },
            until_interrupted(tokio::signal::ctrl_c()),
        )
        .await;

    status.code()
}

fn init_config(path: &str) -> Result<(), ConfigError> {
    if Path::new(path).exists() {
        println!("{} already exists", path);
        return Ok(());
    }

    let yaml = Config::default().to_yaml()?;
    std::fs::write(path, yaml)
        .map_err(|e| ConfigError::Parse(format!("Failed to write config: {}", e)))?;

    println!("Created {}", path);
    Ok(())
}
