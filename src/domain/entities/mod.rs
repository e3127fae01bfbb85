//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod event;
pub mod message;

pub use command::BotCommand;
pub use event::{BrokerEvent, TopicMessage};
pub use message::{ChatMessage, Content};
