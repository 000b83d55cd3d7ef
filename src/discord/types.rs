//! Conversions from serenity models into audit types

use crate::audit::{AuthorInfo, CachedMessage, ChannelId, GuildId, MessageId, StickerRef, UserId};
use serenity::all as dc;

impl From<dc::GuildId> for GuildId {
    fn from(id: dc::GuildId) -> Self {
        Self::new(id.get())
    }
}

impl From<dc::ChannelId> for ChannelId {
    fn from(id: dc::ChannelId) -> Self {
        Self::new(id.get())
    }
}

impl From<ChannelId> for dc::ChannelId {
    fn from(id: ChannelId) -> Self {
        dc::ChannelId::new(id.get())
    }
}

impl From<dc::MessageId> for MessageId {
    fn from(id: dc::MessageId) -> Self {
        Self::new(id.get())
    }
}

impl From<dc::UserId> for UserId {
    fn from(id: dc::UserId) -> Self {
        Self::new(id.get())
    }
}

impl From<&dc::User> for AuthorInfo {
    fn from(user: &dc::User) -> Self {
        Self {
            id: user.id.into(),
            tag: user.tag(),
            avatar_url: user.face(),
            is_bot: user.bot,
        }
    }
}

impl From<&dc::Message> for CachedMessage {
    fn from(message: &dc::Message) -> Self {
        Self {
            author: AuthorInfo::from(&message.author),
            channel_id: message.channel_id.into(),
            content: message.content.clone(),
            attachment_urls: message.attachments.iter().map(|a| a.url.clone()).collect(),
            stickers: message
                .sticker_items
                .iter()
                .map(|s| StickerRef {
                    id: s.id.get(),
                    name: s.name.clone(),
                    format_code: u8::from(s.format_type),
                })
                .collect(),
        }
    }
}

/// Channels a notice can be posted into
pub fn is_text_based(kind: dc::ChannelType) -> bool {
    matches!(
        kind,
        dc::ChannelType::Text
            | dc::ChannelType::News
            | dc::ChannelType::Voice
            | dc::ChannelType::Stage
            | dc::ChannelType::PublicThread
            | dc::ChannelType::PrivateThread
            | dc::ChannelType::NewsThread
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_conversions_round_trip() {
        let channel = dc::ChannelId::new(42);
        let ours: ChannelId = channel.into();
        assert_eq!(ours, ChannelId::new(42));
        assert_eq!(dc::ChannelId::from(ours), channel);

        assert_eq!(GuildId::from(dc::GuildId::new(7)), GuildId::new(7));
        assert_eq!(MessageId::from(dc::MessageId::new(8)), MessageId::new(8));
    }

    #[test]
    fn test_message_conversion_keeps_media() {
        let message: dc::Message = serde_json::from_value(serde_json::json!({
            "id": "1001",
            "channel_id": "300",
            "guild_id": "1",
            "author": {
                "id": "7",
                "username": "alice",
                "discriminator": "0",
                "global_name": "Alice",
                "avatar": null,
                "bot": true
            },
            "content": "look at this",
            "timestamp": "2024-05-01T12:00:00.000000+00:00",
            "edited_timestamp": null,
            "tts": false,
            "mention_everyone": false,
            "mentions": [],
            "mention_roles": [],
            "attachments": [{
                "id": "2001",
                "filename": "cat.png",
                "size": 1234,
                "url": "https://cdn.discordapp.com/attachments/300/2001/cat.png",
                "proxy_url": "https://media.discordapp.net/attachments/300/2001/cat.png",
                "width": 64,
                "height": 64,
                "content_type": "image/png"
            }],
            "embeds": [],
            "pinned": false,
            "type": 0,
            "sticker_items": [{ "id": "3001", "name": "wave", "format_type": 3 }]
        }))
        .unwrap();

        let cached = CachedMessage::from(&message);
        assert_eq!(cached.channel_id, ChannelId::new(300));
        assert_eq!(cached.content, "look at this");
        assert_eq!(cached.author.id, UserId::new(7));
        assert!(cached.author.tag.starts_with("alice"));
        assert!(cached.author.is_bot);
        assert_eq!(
            cached.attachment_urls,
            vec!["https://cdn.discordapp.com/attachments/300/2001/cat.png".to_string()]
        );
        assert_eq!(
            cached.stickers,
            vec![StickerRef {
                id: 3001,
                name: "wave".to_string(),
                format_code: 3,
            }]
        );
    }

    #[test]
    fn test_text_based_channels() {
        assert!(is_text_based(dc::ChannelType::Text));
        assert!(is_text_based(dc::ChannelType::News));
        assert!(!is_text_based(dc::ChannelType::Category));
        assert!(!is_text_based(dc::ChannelType::Forum));
    }
}
