//! Serenity adapter: gateway events in, embeds and interaction replies out

mod client;
mod commands;
mod events;
mod types;

pub use client::{DiscordOutbound, render_embed};
pub use commands::{command_definitions, register_commands};
pub use events::AuditEventHandler;
pub use types::is_text_based;

use crate::config::CacheConfig;
use serenity::all::GatewayIntents;
use serenity::cache::Settings as GatewayCacheSettings;

/// Gateway intents needed for voice and message auditing
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_VOICE_STATES
}

/// serenity's own cache keeps no messages unless told to; the delete and
/// edit handlers read from it.
pub fn gateway_cache_settings(config: &CacheConfig) -> GatewayCacheSettings {
    let mut settings = GatewayCacheSettings::default();
    settings.max_messages = config.gateway_messages;
    settings
}
