use crate::audit::{ChannelId, Notice};
use crate::error::Result;
use async_trait::async_trait;

/// Outbound calls the audit service makes against the chat platform.
///
/// Every call resolves the channel fresh; nothing about a destination is
/// remembered between notices.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Display name of a channel, used for voice notices
    async fn channel_name(&self, channel: ChannelId) -> Result<String>;

    /// Fetch `channel` and post `notice` to it
    async fn deliver(&self, channel: ChannelId, notice: &Notice) -> Result<()>;
}
