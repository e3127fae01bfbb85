//! Application services - Business logic orchestration

pub mod bridge;
pub mod notification_router;

pub use bridge::{until_interrupted, Bridge, ExitStatus};
pub use notification_router::{NotificationRouter, RouteConfig, TopicKind};
