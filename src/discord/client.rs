use crate::audit::{ChannelId, Notice, Outbound};
use crate::discord::types::is_text_based;
use crate::error::{GuildLoggerError, Result};
use async_trait::async_trait;
use serenity::all::{
    Channel, CreateEmbed, CreateEmbedFooter, CreateMessage, GuildChannel, Http,
};
use std::sync::Arc;

/// [`Outbound`] backed by serenity's REST client
pub struct DiscordOutbound {
    http: Arc<Http>,
}

impl DiscordOutbound {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Fetch a guild channel by id
    async fn fetch_guild_channel(&self, channel: ChannelId) -> Result<GuildChannel> {
        match self.http.get_channel(channel.into()).await? {
            Channel::Guild(guild_channel) => Ok(guild_channel),
            _ => Err(GuildLoggerError::ChannelUnavailable(format!(
                "{channel} is not a guild channel"
            ))),
        }
    }
}

#[async_trait]
impl Outbound for DiscordOutbound {
    async fn channel_name(&self, channel: ChannelId) -> Result<String> {
        Ok(self.fetch_guild_channel(channel).await?.name)
    }

    async fn deliver(&self, channel: ChannelId, notice: &Notice) -> Result<()> {
        let target = self.fetch_guild_channel(channel).await?;
        if !is_text_based(target.kind) {
            return Err(GuildLoggerError::ChannelUnavailable(format!(
                "{} ({channel}) cannot receive messages",
                target.name
            )));
        }

        target
            .id
            .send_message(&self.http, CreateMessage::new().embed(render_embed(notice)))
            .await?;
        Ok(())
    }
}

pub fn render_embed(notice: &Notice) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("{} {}", notice.kind.icon(), notice.title()))
        .colour(notice.colour())
        .footer(CreateEmbedFooter::new(notice.footer.as_str()));

    if let Some(thumbnail) = &notice.thumbnail {
        embed = embed.thumbnail(thumbnail.as_str());
    }
    for field in &notice.fields {
        embed = embed.field(field.name.as_str(), field.value.as_str(), field.inline);
    }
    if let Some(image) = &notice.image {
        embed = embed.image(image.as_str());
    }
    embed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::notices::voice_joined;
    use crate::audit::{AuthorInfo, UserId};
    use chrono::Local;

    #[test]
    fn test_render_embed() {
        let member = AuthorInfo {
            id: UserId::new(7),
            tag: "alice".to_string(),
            avatar_url: "https://cdn.example/alice.png".to_string(),
            is_bot: false,
        };
        let notice = voice_joined(&member, "General", Local::now());

        let json = serde_json::to_value(render_embed(&notice)).unwrap();
        assert_eq!(json["title"], "🎧 Member Joined Voice Channel");
        assert_eq!(json["color"], 0x00ff00);
        assert_eq!(json["thumbnail"]["url"], "https://cdn.example/alice.png");
        assert_eq!(json["fields"][0]["value"], "alice");
        assert_eq!(json["fields"][1]["value"], "General");
        assert_eq!(json["fields"][1]["inline"], true);
        assert!(json["footer"]["text"].as_str().unwrap().starts_with("Today at "));
    }
}
