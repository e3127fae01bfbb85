//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Transport integrations (Telegram, console, MQTT)

pub mod adapters;
pub mod config;
