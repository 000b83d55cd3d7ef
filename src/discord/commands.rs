use crate::audit::configure::{
    CHANNEL_OPTION, CHANNEL_OPTION_DESCRIPTION, COMMAND_DESCRIPTION, COMMAND_NAME,
};
use crate::audit::{AuditService, ChannelArgument, ConfigureRequest};
use crate::error::Result;
use serenity::all::{
    ChannelType, Command, CommandInteraction, CommandOptionType, CreateCommand,
    CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseMessage, Http,
    Permissions, ResolvedValue,
};

pub fn command_definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(COMMAND_NAME)
            .description(COMMAND_DESCRIPTION)
            .default_member_permissions(Permissions::ADMINISTRATOR)
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    CHANNEL_OPTION,
                    CHANNEL_OPTION_DESCRIPTION,
                )
                .required(true)
                .channel_types(vec![ChannelType::Text]),
            ),
    ]
}

/// Replace the application's global commands with ours
pub async fn register_commands(http: &Http) -> Result<()> {
    let registered = Command::set_global_commands(http, command_definitions()).await?;
    tracing::info!(count = registered.len(), "Application commands registered");
    Ok(())
}

/// Build the platform-neutral request from a command invocation
pub fn configure_request(command: &CommandInteraction) -> ConfigureRequest {
    let invoker_is_admin = command
        .member
        .as_ref()
        .and_then(|member| member.permissions)
        .is_some_and(|permissions| permissions.administrator());

    let channel = command
        .data
        .options()
        .into_iter()
        .find(|option| option.name == CHANNEL_OPTION)
        .and_then(|option| match option.value {
            ResolvedValue::Channel(channel) => Some(ChannelArgument {
                id: channel.id.into(),
                name: channel
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("<#{}>", channel.id)),
                is_text: channel.kind == ChannelType::Text,
            }),
            _ => None,
        });

    ConfigureRequest {
        guild_id: command.guild_id.map(Into::into),
        invoker_is_admin,
        channel,
    }
}

pub async fn handle_command(
    http: &Http,
    service: &AuditService,
    command: &CommandInteraction,
) -> Result<()> {
    if command.data.name != COMMAND_NAME {
        tracing::warn!(command = %command.data.name, "Unknown command");
        return Ok(());
    }

    let request = configure_request(command);
    let outcome = service.configure(&request);
    tracing::info!(
        user = %command.user.tag(),
        guild_id = ?request.guild_id.map(|g| g.get()),
        outcome = ?outcome,
        "Handled /{}",
        COMMAND_NAME
    );

    let reply = CreateInteractionResponseMessage::new()
        .content(outcome.reply())
        .ephemeral(outcome.is_ephemeral());
    command
        .create_response(http, CreateInteractionResponse::Message(reply))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_admin_command_defined() {
        let commands = command_definitions();
        assert_eq!(commands.len(), 1);

        let json = serde_json::to_value(&commands[0]).unwrap();
        assert_eq!(json["name"], COMMAND_NAME);
        assert_eq!(
            json["default_member_permissions"],
            Permissions::ADMINISTRATOR.bits().to_string()
        );
        assert_eq!(json["options"][0]["name"], CHANNEL_OPTION);
        assert_eq!(json["options"][0]["required"], true);
        assert_eq!(json["options"][0]["channel_types"][0], 0);
    }
}
