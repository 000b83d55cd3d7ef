use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! snowflake {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(GuildId);
snowflake!(ChannelId);
snowflake!(MessageId);
snowflake!(UserId);

impl ChannelId {
    /// Discord channel mention, e.g. `<#123>`
    pub fn mention(self) -> String {
        format!("<#{}>", self.0)
    }
}

/// Who wrote a message or changed voice state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorInfo {
    pub id: UserId,
    /// `name#discriminator`, or the bare username for migrated accounts
    pub tag: String,
    pub avatar_url: String,
    pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickerRef {
    pub id: u64,
    pub name: String,
    pub format_code: u8,
}

/// Snapshot of a message as it was first observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedMessage {
    pub author: AuthorInfo,
    pub channel_id: ChannelId,
    pub content: String,
    pub attachment_urls: Vec<String>,
    pub stickers: Vec<StickerRef>,
}

impl CachedMessage {
    /// Drop everything but the author and channel.
    pub fn into_bot_marker(self) -> Self {
        Self {
            content: String::new(),
            attachment_urls: Vec::new(),
            stickers: Vec::new(),
            ..self
        }
    }
}

/// A newly created guild message
#[derive(Debug, Clone)]
pub struct MessageCreated {
    pub id: MessageId,
    pub guild_id: Option<GuildId>,
    pub message: CachedMessage,
}

#[derive(Debug, Clone)]
pub struct MessageDeleted {
    pub id: MessageId,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    /// Whatever the delete notification itself carried
    pub partial: Option<CachedMessage>,
}

#[derive(Debug, Clone)]
pub struct MessageEdited {
    pub id: MessageId,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    /// Pre-edit snapshot supplied by the gateway client, if it had one
    pub before: Option<CachedMessage>,
    /// `None` when the update did not touch the text (e.g. embed resolution)
    pub after_content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VoiceStateChange {
    pub guild_id: Option<GuildId>,
    pub member: AuthorInfo,
    pub before: Option<ChannelId>,
    pub after: Option<ChannelId>,
    /// Name of the joined or left channel, when the gateway cache had it
    pub channel_name: Option<String>,
}

/// Membership transition derived from a voice state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceTransition {
    Joined(ChannelId),
    Left(ChannelId),
}

impl VoiceStateChange {
    /// Switching between two channels, or a mute/deafen update, is not a transition.
    pub fn transition(&self) -> Option<VoiceTransition> {
        match (self.before, self.after) {
            (None, Some(channel)) => Some(VoiceTransition::Joined(channel)),
            (Some(channel), None) => Some(VoiceTransition::Left(channel)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> AuthorInfo {
        AuthorInfo {
            id: UserId::new(7),
            tag: "alice".to_string(),
            avatar_url: "https://cdn.example/a.png".to_string(),
            is_bot: false,
        }
    }

    fn change(before: Option<u64>, after: Option<u64>) -> VoiceStateChange {
        VoiceStateChange {
            guild_id: Some(GuildId::new(1)),
            member: member(),
            before: before.map(ChannelId::new),
            after: after.map(ChannelId::new),
            channel_name: None,
        }
    }

    #[test]
    fn test_channel_mention() {
        assert_eq!(ChannelId::new(42).mention(), "<#42>");
    }

    #[test]
    fn test_voice_transitions() {
        assert_eq!(
            change(None, Some(5)).transition(),
            Some(VoiceTransition::Joined(ChannelId::new(5)))
        );
        assert_eq!(
            change(Some(5), None).transition(),
            Some(VoiceTransition::Left(ChannelId::new(5)))
        );
        assert_eq!(change(Some(5), Some(6)).transition(), None);
        assert_eq!(change(Some(5), Some(5)).transition(), None);
        assert_eq!(change(None, None).transition(), None);
    }
}
