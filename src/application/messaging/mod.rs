//! Message handling - Formatting, parsing and dispatching chat traffic

pub mod dispatcher;
pub mod format;
pub mod parser;

pub use dispatcher::{run_polling, MessageDispatcher};
pub use parser::MessageParser;
