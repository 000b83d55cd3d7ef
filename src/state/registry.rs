//! Per-guild log channel registry

use crate::audit::{ChannelId, GuildId};
use dashmap::DashMap;

/// Maps each guild to the one channel that receives its notices.
///
/// In-memory only: entries never expire and start empty on every launch.
#[derive(Debug, Default)]
pub struct LogChannelRegistry {
    channels: DashMap<GuildId, ChannelId>,
}

impl LogChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `guild` at `channel`, returning the channel it replaced.
    pub fn set(&self, guild: GuildId, channel: ChannelId) -> Option<ChannelId> {
        let previous = self.channels.insert(guild, channel);
        tracing::info!(
            guild_id = %guild,
            channel_id = %channel,
            previous = ?previous.map(|c| c.get()),
            "Log channel configured"
        );
        previous
    }

    pub fn get(&self, guild: GuildId) -> Option<ChannelId> {
        self.channels.get(&guild).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
