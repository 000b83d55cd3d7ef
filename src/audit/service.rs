use crate::audit::configure::{self, ConfigureOutcome, ConfigureRequest};
use crate::audit::notices;
use crate::audit::{
    ChannelId, MessageCreated, MessageDeleted, MessageEdited, Notice, Outbound,
    VoiceStateChange, VoiceTransition,
};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::logging::{Timer, preview};
use crate::state::{LogChannelRegistry, MessageCache};
use chrono::Local;

/// What happened to one inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A notice was posted to the guild's log channel
    Delivered,
    /// The guild has no log channel
    Unconfigured,
    /// The event does not produce a notice
    Ignored,
}

/// Owns the log channel registry and message cache and turns gateway
/// events into notices.
pub struct AuditService {
    registry: LogChannelRegistry,
    cache: MessageCache,
}

impl AuditService {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            registry: LogChannelRegistry::new(),
            cache: MessageCache::new(config.capacity, config.ttl),
        }
    }

    pub fn registry(&self) -> &LogChannelRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &MessageCache {
        &self.cache
    }

    /// Apply a `/setlogchannel` invocation.
    pub fn configure(&self, request: &ConfigureRequest) -> ConfigureOutcome {
        let outcome = configure::evaluate(request);
        match &outcome {
            ConfigureOutcome::Configured {
                guild_id,
                channel_id,
                ..
            } => {
                self.registry.set(*guild_id, *channel_id);
            }
            rejected => {
                tracing::info!(
                    guild_id = ?request.guild_id.map(|g| g.get()),
                    outcome = ?rejected,
                    "Log channel configuration rejected"
                );
            }
        }
        outcome
    }

    /// Cache a new message so its body survives deletion.
    ///
    /// Bot messages are kept only as a content-free marker so that a later
    /// delete or edit of them can be recognised and skipped.
    pub fn on_message_created(&self, event: MessageCreated) {
        if event.message.author.is_bot {
            tracing::trace!(message_id = %event.id, "Marking bot message");
            self.cache.record(event.id, event.message.into_bot_marker());
            return;
        }
        tracing::trace!(
            message_id = %event.id,
            channel_id = %event.message.channel_id,
            content = %preview(&event.message.content),
            "Caching message"
        );
        self.cache.record(event.id, event.message);
    }

    pub async fn on_voice_state(
        &self,
        outbound: &dyn Outbound,
        event: VoiceStateChange,
    ) -> Result<Dispatch> {
        let Some(transition) = event.transition() else {
            return Ok(Dispatch::Ignored);
        };
        let Some(guild_id) = event.guild_id else {
            return Ok(Dispatch::Ignored);
        };
        let Some(destination) = self.registry.get(guild_id) else {
            return Ok(Dispatch::Unconfigured);
        };

        let voice_channel = match transition {
            VoiceTransition::Joined(channel) | VoiceTransition::Left(channel) => channel,
        };
        let resolved = match event.channel_name.clone() {
            Some(name) => Ok(name),
            None => outbound.channel_name(voice_channel).await,
        };
        let channel_name = match resolved {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(
                    channel_id = %voice_channel,
                    error = %e,
                    "Failed to resolve voice channel name, using mention"
                );
                voice_channel.mention()
            }
        };

        let notice = match transition {
            VoiceTransition::Joined(_) => {
                notices::voice_joined(&event.member, &channel_name, Local::now())
            }
            VoiceTransition::Left(_) => {
                notices::voice_left(&event.member, &channel_name, Local::now())
            }
        };

        tracing::info!(
            guild_id = %guild_id,
            member = %event.member.tag,
            channel = %channel_name,
            transition = ?transition,
            "Voice state change"
        );
        self.deliver(outbound, destination, &notice).await
    }

    pub async fn on_message_deleted(
        &self,
        outbound: &dyn Outbound,
        event: MessageDeleted,
    ) -> Result<Dispatch> {
        let message = self.cache.lookup(event.id).or(event.partial);

        if message.as_ref().is_some_and(|m| m.author.is_bot) {
            return Ok(Dispatch::Ignored);
        }
        let Some(guild_id) = event.guild_id else {
            return Ok(Dispatch::Ignored);
        };
        let Some(destination) = self.registry.get(guild_id) else {
            return Ok(Dispatch::Unconfigured);
        };

        if message.is_none() {
            tracing::debug!(
                message_id = %event.id,
                "Deleted message not cached, sending notice without content"
            );
        }

        let notice = notices::message_deleted(event.channel_id, message.as_ref(), Local::now());
        tracing::info!(
            guild_id = %guild_id,
            message_id = %event.id,
            channel_id = %event.channel_id,
            cached = message.is_some(),
            "Message deleted"
        );
        self.deliver(outbound, destination, &notice).await
    }

    pub async fn on_message_edited(
        &self,
        outbound: &dyn Outbound,
        event: MessageEdited,
    ) -> Result<Dispatch> {
        // The cached entry stays at its pre-edit content.
        let Some(before) = event.before.or_else(|| self.cache.lookup(event.id)) else {
            tracing::debug!(message_id = %event.id, "Edited message unknown, skipping");
            return Ok(Dispatch::Ignored);
        };
        if before.author.is_bot {
            return Ok(Dispatch::Ignored);
        }
        let Some(guild_id) = event.guild_id else {
            return Ok(Dispatch::Ignored);
        };
        let Some(destination) = self.registry.get(guild_id) else {
            return Ok(Dispatch::Unconfigured);
        };
        let Some(after) = event.after_content else {
            return Ok(Dispatch::Ignored);
        };
        if after == before.content {
            return Ok(Dispatch::Ignored);
        }

        let notice = notices::message_edited(&before, &after, Local::now());
        tracing::info!(
            guild_id = %guild_id,
            message_id = %event.id,
            channel_id = %event.channel_id,
            before = %preview(&before.content),
            after = %preview(&after),
            "Message edited"
        );
        self.deliver(outbound, destination, &notice).await
    }

    async fn deliver(
        &self,
        outbound: &dyn Outbound,
        destination: ChannelId,
        notice: &Notice,
    ) -> Result<Dispatch> {
        let _timer = Timer::new("deliver_notice");
        outbound.deliver(destination, notice).await?;
        tracing::debug!(
            channel_id = %destination,
            notice = notice.title(),
            "Notice delivered"
        );
        Ok(Dispatch::Delivered)
    }
}
