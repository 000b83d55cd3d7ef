//! Notice construction for each audited event
//!
//! A [`Notice`] is platform-neutral; the Discord adapter renders it as an embed.

use crate::audit::{AuthorInfo, CachedMessage, ChannelId};
use chrono::{DateTime, Local};

/// Sticker format code Discord uses for animated stickers
pub const ANIMATED_STICKER_FORMAT: u8 = 3;

/// Embed field value limit
pub const MAX_FIELD_CHARS: usize = 1024;

/// Embed field count limit
pub const MAX_FIELDS: usize = 25;

const EMPTY_TEXT: &str = "*(no text)*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    VoiceJoined,
    VoiceLeft,
    MessageDeleted,
    MessageEdited,
}

impl NoticeKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::VoiceJoined => "Member Joined Voice Channel",
            Self::VoiceLeft => "Member Left Voice Channel",
            Self::MessageDeleted => "Message Deleted",
            Self::MessageEdited => "Message Edited",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::VoiceJoined | Self::VoiceLeft => "🎧",
            Self::MessageDeleted => "🗑️",
            Self::MessageEdited => "✏️",
        }
    }

    pub fn colour(self) -> u32 {
        match self {
            Self::VoiceJoined => 0x00ff00,
            Self::VoiceLeft | Self::MessageDeleted => 0xff0000,
            Self::MessageEdited => 0xffaa00,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub fields: Vec<NoticeField>,
    pub footer: String,
}

impl Notice {
    fn new(kind: NoticeKind, at: DateTime<Local>) -> Self {
        Self {
            kind,
            thumbnail: None,
            image: None,
            fields: Vec::new(),
            footer: format!("Today at {}", at.format("%H:%M:%S")),
        }
    }

    fn field(mut self, name: &str, value: impl Into<String>, inline: bool) -> Self {
        if self.fields.len() < MAX_FIELDS {
            self.fields.push(NoticeField {
                name: name.to_string(),
                value: clamp(&value.into()),
                inline,
            });
        }
        self
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn colour(&self) -> u32 {
        self.kind.colour()
    }

    /// Value of the first field with this name
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Whether any field value contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.fields.iter().any(|f| f.value.contains(needle))
    }
}

pub const FIELD_MEMBER: &str = "📌 Member";
pub const FIELD_AUTHOR: &str = "📌 Author";
pub const FIELD_CHANNEL: &str = "📢 Channel";
pub const FIELD_CONTENT: &str = "💬 Content";
pub const FIELD_ATTACHMENT: &str = "📎 Attachment Deleted";
pub const FIELD_STICKER: &str = "🎭 Sticker Deleted";
pub const FIELD_BEFORE: &str = "📝 Before";
pub const FIELD_AFTER: &str = "📝 After";

pub fn sticker_url(id: u64, format_code: u8) -> String {
    if format_code == ANIMATED_STICKER_FORMAT {
        format!("https://cdn.discordapp.com/stickers/{id}.apng")
    } else {
        format!("https://media.discordapp.net/stickers/{id}.png")
    }
}

pub fn voice_joined(member: &AuthorInfo, channel_name: &str, at: DateTime<Local>) -> Notice {
    voice(NoticeKind::VoiceJoined, member, channel_name, at)
}

pub fn voice_left(member: &AuthorInfo, channel_name: &str, at: DateTime<Local>) -> Notice {
    voice(NoticeKind::VoiceLeft, member, channel_name, at)
}

fn voice(kind: NoticeKind, member: &AuthorInfo, channel_name: &str, at: DateTime<Local>) -> Notice {
    let mut notice = Notice::new(kind, at)
        .field(FIELD_MEMBER, member.tag.as_str(), true)
        .field(FIELD_CHANNEL, channel_name, true);
    notice.thumbnail = Some(member.avatar_url.clone());
    notice
}

/// Deletion notice; `message` is `None` when neither the cache nor the
/// gateway knew anything about the deleted message.
pub fn message_deleted(
    channel_id: ChannelId,
    message: Option<&CachedMessage>,
    at: DateTime<Local>,
) -> Notice {
    let Some(message) = message else {
        return Notice::new(NoticeKind::MessageDeleted, at)
            .field(FIELD_AUTHOR, "Unknown", true)
            .field(FIELD_CHANNEL, channel_id.mention(), true)
            .field(FIELD_CONTENT, "*(message was not cached)*", false);
    };

    let mut notice = Notice::new(NoticeKind::MessageDeleted, at)
        .field(FIELD_AUTHOR, message.author.tag.as_str(), true)
        .field(FIELD_CHANNEL, message.channel_id.mention(), true);

    if !message.content.is_empty() {
        notice = notice.field(FIELD_CONTENT, message.content.as_str(), false);
    }

    for url in &message.attachment_urls {
        notice = notice.field(FIELD_ATTACHMENT, format!("[View File]({url})"), false);
        notice.image = Some(url.clone());
    }

    for sticker in &message.stickers {
        let url = sticker_url(sticker.id, sticker.format_code);
        notice = notice.field(
            FIELD_STICKER,
            format!("**{}**\n[View Sticker]({url})", sticker.name),
            false,
        );
        notice.image = Some(url);
    }

    notice
}

pub fn message_edited(before: &CachedMessage, after: &str, at: DateTime<Local>) -> Notice {
    Notice::new(NoticeKind::MessageEdited, at)
        .field(FIELD_AUTHOR, before.author.tag.as_str(), true)
        .field(FIELD_CHANNEL, before.channel_id.mention(), true)
        .field(FIELD_BEFORE, or_placeholder(&before.content), false)
        .field(FIELD_AFTER, or_placeholder(after), false)
}

fn or_placeholder(text: &str) -> &str {
    if text.is_empty() { EMPTY_TEXT } else { text }
}

fn clamp(value: &str) -> String {
    if value.chars().count() <= MAX_FIELD_CHARS {
        return value.to_string();
    }
    let mut clamped: String = value.chars().take(MAX_FIELD_CHARS - 1).collect();
    clamped.push('…');
    clamped
}
