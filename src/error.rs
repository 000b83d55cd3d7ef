use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuildLoggerError {
    #[error("Discord API error: {0}")]
    Discord(String),

    #[error("Log channel unavailable: {0}")]
    ChannelUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serenity::Error> for GuildLoggerError {
    fn from(err: serenity::Error) -> Self {
        Self::Discord(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GuildLoggerError>;
