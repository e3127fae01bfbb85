//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod broker;

pub use bot::{Bot, BotInfo, ParseMode};
pub use broker::{Broker, Qos};
