//! Guild audit logging
//!
//! Turns voice and message lifecycle events into notices for the guild's
//! configured log channel.

pub mod configure;
pub mod notices;
mod port;
mod service;
mod types;

pub use configure::{ChannelArgument, ConfigureOutcome, ConfigureRequest};
pub use notices::{Notice, NoticeField, NoticeKind, sticker_url};
pub use port::Outbound;
pub use service::{AuditService, Dispatch};
pub use types::{
    AuthorInfo, CachedMessage, ChannelId, GuildId, MessageCreated, MessageDeleted, MessageEdited,
    MessageId, StickerRef, UserId, VoiceStateChange, VoiceTransition,
};
