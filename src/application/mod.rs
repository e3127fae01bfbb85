//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: The notification router
//! - Errors: Transport and configuration errors
//! - Messaging: Formatting, parsing, dispatching

pub mod errors;
pub mod messaging;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
