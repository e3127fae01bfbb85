//! MQTT to Telegram bridge for a weighing scale.
//!
//! Readings and status messages published by the scale are forwarded to a
//! Telegram chat; `/status` in the chat asks the scale for a status report.

pub mod application;
pub mod domain;
pub mod infrastructure;
