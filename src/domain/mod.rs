//! Domain layer - Core types with no transport dependencies
//!
//! This layer contains:
//! - Entities: Inbound chat messages, broker events, bot commands
//! - Traits: Abstractions for the transports (Bot, Broker)

pub mod entities;
pub mod traits;
