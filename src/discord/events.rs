use crate::audit::{
    AuditService, AuthorInfo, CachedMessage, Dispatch, MessageCreated, MessageDeleted,
    MessageEdited, VoiceStateChange,
};
use crate::discord::DiscordOutbound;
use crate::discord::commands::{handle_command, register_commands};
use crate::error::Result;
use crate::logging::log_error;
use async_trait::async_trait;
use serenity::all::{
    ChannelId, Context, EventHandler, GuildId, Interaction, Message, MessageId,
    MessageUpdateEvent, Ready, VoiceState,
};
use std::sync::Arc;

/// Gateway callbacks; each one converts the serenity event and hands it to
/// the [`AuditService`].
pub struct AuditEventHandler {
    service: Arc<AuditService>,
}

impl AuditEventHandler {
    pub fn new(service: Arc<AuditService>) -> Self {
        Self { service }
    }

    fn is_configured(&self, guild_id: Option<GuildId>) -> bool {
        guild_id.is_some_and(|id| self.service.registry().get(id.into()).is_some())
    }

    fn report(operation: &str, result: Result<Dispatch>) {
        match result {
            Ok(dispatch) => tracing::trace!(operation = %operation, ?dispatch, "Event handled"),
            Err(e) => log_error(operation, &e),
        }
    }
}

#[async_trait]
impl EventHandler for AuditEventHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!(
            user = %ready.user.tag(),
            guilds = ready.guilds.len(),
            "Logged in"
        );

        if let Err(e) = register_commands(&ctx.http).await {
            log_error("register_commands", &e);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        if let Err(e) = handle_command(&ctx.http, &self.service, &command).await {
            log_error("handle_command", &e);
        }
    }

    async fn message(&self, _ctx: Context, message: Message) {
        self.service.on_message_created(MessageCreated {
            id: message.id.into(),
            guild_id: message.guild_id.map(Into::into),
            message: CachedMessage::from(&message),
        });
    }

    async fn message_delete(
        &self,
        ctx: Context,
        channel_id: ChannelId,
        deleted_message_id: MessageId,
        guild_id: Option<GuildId>,
    ) {
        // serenity keeps the most recent messages per channel; older ones miss.
        let partial = ctx
            .cache
            .message(channel_id, deleted_message_id)
            .map(|message| CachedMessage::from(&*message));

        let event = MessageDeleted {
            id: deleted_message_id.into(),
            guild_id: guild_id.map(Into::into),
            channel_id: channel_id.into(),
            partial,
        };
        let outbound = DiscordOutbound::new(ctx.http.clone());
        Self::report(
            "message_delete",
            self.service.on_message_deleted(&outbound, event).await,
        );
    }

    async fn message_update(
        &self,
        ctx: Context,
        old_if_available: Option<Message>,
        _new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        let event = MessageEdited {
            id: event.id.into(),
            guild_id: event.guild_id.map(Into::into),
            channel_id: event.channel_id.into(),
            before: old_if_available.as_ref().map(CachedMessage::from),
            after_content: event.content,
        };
        let outbound = DiscordOutbound::new(ctx.http.clone());
        Self::report(
            "message_update",
            self.service.on_message_edited(&outbound, event).await,
        );
    }

    async fn voice_state_update(&self, ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        let member = match &new.member {
            Some(member) => AuthorInfo::from(&member.user),
            // Skip the user lookup when nothing would be posted anyway
            None if !self.is_configured(new.guild_id) => return,
            None => match new.user_id.to_user(&ctx).await {
                Ok(user) => AuthorInfo::from(&user),
                Err(e) => {
                    tracing::warn!(
                        user_id = %new.user_id,
                        error = %e,
                        "Failed to resolve voice state member"
                    );
                    return;
                }
            },
        };

        let before = old.and_then(|state| state.channel_id);
        let channel_name = new
            .channel_id
            .or(before)
            .and_then(|id| ctx.cache.channel(id).map(|channel| channel.name.clone()));

        let event = VoiceStateChange {
            guild_id: new.guild_id.map(Into::into),
            member,
            before: before.map(Into::into),
            after: new.channel_id.map(Into::into),
            channel_name,
        };
        let outbound = DiscordOutbound::new(ctx.http.clone());
        Self::report(
            "voice_state_update",
            self.service.on_voice_state(&outbound, event).await,
        );
    }
}
