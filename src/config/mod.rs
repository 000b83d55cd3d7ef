mod settings;

pub use settings::{
    CacheConfig, DiscordConfig, PresenceConfig, Settings, load_presence_settings, load_settings,
};
