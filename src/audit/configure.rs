//! Decision logic for the `/setlogchannel` command

use crate::audit::{ChannelId, GuildId};

pub const COMMAND_NAME: &str = "setlogchannel";
pub const COMMAND_DESCRIPTION: &str = "Set the channel that receives voice and message logs";
pub const CHANNEL_OPTION: &str = "channel";
pub const CHANNEL_OPTION_DESCRIPTION: &str = "Text channel for log notices";

/// The channel argument as resolved by the platform
#[derive(Debug, Clone)]
pub struct ChannelArgument {
    pub id: ChannelId,
    pub name: String,
    pub is_text: bool,
}

#[derive(Debug, Clone)]
pub struct ConfigureRequest {
    pub guild_id: Option<GuildId>,
    pub invoker_is_admin: bool,
    pub channel: Option<ChannelArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigureOutcome {
    Configured {
        guild_id: GuildId,
        channel_id: ChannelId,
        channel_name: String,
    },
    NotInGuild,
    PermissionDenied,
    MissingChannel,
    NotTextChannel,
}

impl ConfigureOutcome {
    pub fn reply(&self) -> String {
        match self {
            Self::Configured { channel_name, .. } => {
                format!("✅ Log channel set to {channel_name} for this server.")
            }
            Self::NotInGuild => "❌ This command can only be used inside a server.".to_string(),
            Self::PermissionDenied => {
                "❌ You do not have permission to use this command!".to_string()
            }
            Self::MissingChannel => "❌ Please choose a channel for the logs!".to_string(),
            Self::NotTextChannel => "❌ Please choose a text channel for the logs!".to_string(),
        }
    }

    /// Rejections are shown only to the invoker.
    pub fn is_ephemeral(&self) -> bool {
        !matches!(self, Self::Configured { .. })
    }
}

/// Validate a request; does not touch the registry.
pub fn evaluate(request: &ConfigureRequest) -> ConfigureOutcome {
    let Some(guild_id) = request.guild_id else {
        return ConfigureOutcome::NotInGuild;
    };
    if !request.invoker_is_admin {
        return ConfigureOutcome::PermissionDenied;
    }
    let Some(channel) = &request.channel else {
        return ConfigureOutcome::MissingChannel;
    };
    if !channel.is_text {
        return ConfigureOutcome::NotTextChannel;
    }

    ConfigureOutcome::Configured {
        guild_id,
        channel_id: channel.id,
        channel_name: channel.name.clone(),
    }
}
