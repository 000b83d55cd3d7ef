//! In-memory state shared by the event handlers
//!
//! Nothing here is persisted; both maps start empty on every launch.

mod message_cache;
mod registry;

pub use message_cache::{CacheStats, MessageCache};
pub use registry::LogChannelRegistry;
