//! Transport adapters - Telegram, console and MQTT

pub mod console;
pub mod mqtt;
pub mod telegram;

pub use console::ConsoleAdapter;
pub use mqtt::MqttAdapter;
pub use telegram::TelegramAdapter;
