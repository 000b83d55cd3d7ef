use crate::error::{GuildLoggerError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord: DiscordConfig,
    pub cache: CacheConfig,
}

#[derive(Clone)]
pub struct DiscordConfig {
    pub token: String,
}

// Keep the token out of debug output.
impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub capacity: usize,
    /// `None` keeps entries until they are evicted by capacity
    pub ttl: Option<Duration>,
    pub report_interval: Duration,
    /// Messages per channel kept by serenity's gateway cache
    pub gateway_messages: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            ttl: Some(Duration::from_secs(86_400)),
            report_interval: Duration::from_secs(3600),
            gateway_messages: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PresenceConfig {
    pub client_id: String,
    pub details: String,
    pub state: String,
    pub large_image_key: String,
    pub large_image_text: String,
    pub button_label: String,
    pub button_url: String,
}

/// Shape of the optional JSON settings file
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    token: Option<String>,
}

pub fn load_settings() -> Result<Settings> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let lookup = |key: &str| std::env::var(key).ok();
    let path = lookup("GUILD_LOGGER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    Settings::from_sources(lookup, &path)
}

pub fn load_presence_settings() -> Result<PresenceConfig> {
    dotenvy::dotenv().ok();
    PresenceConfig::from_lookup(|key| std::env::var(key).ok())
}

impl Settings {
    /// Build settings from a variable lookup, reading the token from the
    /// JSON file at `path` when the variable is unset.
    pub fn from_sources(lookup: impl Fn(&str) -> Option<String>, path: &Path) -> Result<Self> {
        let token = match lookup("DISCORD_TOKEN").filter(|t| !t.trim().is_empty()) {
            Some(token) => token,
            None => read_file_settings(path)?.token.ok_or_else(|| {
                GuildLoggerError::Config(format!(
                    "DISCORD_TOKEN not set and no token in {}",
                    path.display()
                ))
            })?,
        };

        let defaults = CacheConfig::default();
        let capacity: usize = parse_or(&lookup, "MESSAGE_CACHE_CAPACITY", defaults.capacity)?;
        if capacity == 0 {
            return Err(GuildLoggerError::Config(
                "MESSAGE_CACHE_CAPACITY must be greater than zero".to_string(),
            ));
        }
        let ttl_secs: u64 = parse_or(&lookup, "MESSAGE_CACHE_TTL_SECS", 86_400)?;
        let report_secs: u64 = parse_or(&lookup, "CACHE_REPORT_INTERVAL_SECS", 3600)?;
        let gateway_messages: usize =
            parse_or(&lookup, "GATEWAY_MESSAGE_CACHE", defaults.gateway_messages)?;

        Ok(Self {
            discord: DiscordConfig { token },
            cache: CacheConfig {
                capacity,
                ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
                report_interval: Duration::from_secs(report_secs.max(1)),
                gateway_messages,
            },
        })
    }
}

impl PresenceConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let client_id = get("DISCORD_CLIENT_ID", "916284732675870740");
        if client_id.is_empty() || !client_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(GuildLoggerError::Config(format!(
                "Invalid DISCORD_CLIENT_ID: {client_id}"
            )));
        }

        Ok(Self {
            client_id,
            details: get("PRESENCE_DETAILS", "マキマ"),
            state: get("PRESENCE_STATE", "100% introvert"),
            large_image_key: get("PRESENCE_LARGE_IMAGE_KEY", "chainsaw_man_makima"),
            large_image_text: get("PRESENCE_LARGE_IMAGE_TEXT", "Kapan Yah"),
            button_label: get("PRESENCE_BUTTON_LABEL", "フリーレン"),
            button_url: get(
                "PRESENCE_BUTTON_URL",
                "https://frieren.fandom.com/wiki/Frieren",
            ),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| GuildLoggerError::Config(format!("Invalid {key}"))),
        None => Ok(default),
    }
}

fn read_file_settings(path: &Path) -> Result<FileSettings> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileSettings::default()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn missing_file() -> PathBuf {
        PathBuf::from("/nonexistent/guild-logger/config.json")
    }

    #[test]
    fn test_env_token_and_defaults() {
        let settings =
            Settings::from_sources(vars(&[("DISCORD_TOKEN", "abc")]), &missing_file()).unwrap();

        assert_eq!(settings.discord.token, "abc");
        assert_eq!(settings.cache.capacity, 10_000);
        assert_eq!(settings.cache.ttl, Some(Duration::from_secs(86_400)));
        assert_eq!(settings.cache.report_interval, Duration::from_secs(3600));
        assert_eq!(settings.cache.gateway_messages, 100);
    }

    #[test]
    fn test_token_falls_back_to_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"token": "from-file"}}"#).unwrap();

        let settings = Settings::from_sources(vars(&[]), file.path()).unwrap();
        assert_eq!(settings.discord.token, "from-file");
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let err = Settings::from_sources(vars(&[]), &missing_file()).unwrap_err();
        assert!(matches!(err, GuildLoggerError::Config(_)));
    }

    #[test]
    fn test_malformed_file_is_serde_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Settings::from_sources(vars(&[]), file.path()).unwrap_err();
        assert!(matches!(err, GuildLoggerError::Serde(_)));
    }

    #[test]
    fn test_cache_overrides() {
        let settings = Settings::from_sources(
            vars(&[
                ("DISCORD_TOKEN", "abc"),
                ("MESSAGE_CACHE_CAPACITY", "50"),
                ("MESSAGE_CACHE_TTL_SECS", "0"),
                ("GATEWAY_MESSAGE_CACHE", "25"),
            ]),
            &missing_file(),
        )
        .unwrap();

        assert_eq!(settings.cache.capacity, 50);
        assert_eq!(settings.cache.ttl, None);
        assert_eq!(settings.cache.gateway_messages, 25);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let err = Settings::from_sources(
            vars(&[("DISCORD_TOKEN", "abc"), ("MESSAGE_CACHE_CAPACITY", "lots")]),
            &missing_file(),
        )
        .unwrap_err();
        assert!(matches!(err, GuildLoggerError::Config(_)));

        let err = Settings::from_sources(
            vars(&[("DISCORD_TOKEN", "abc"), ("MESSAGE_CACHE_CAPACITY", "0")]),
            &missing_file(),
        )
        .unwrap_err();
        assert!(matches!(err, GuildLoggerError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = DiscordConfig {
            token: "secret".to_string(),
        };
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_presence_defaults_and_overrides() {
        let config = PresenceConfig::from_lookup(vars(&[("PRESENCE_STATE", "busy")])).unwrap();
        assert_eq!(config.client_id, "916284732675870740");
        assert_eq!(config.state, "busy");
        assert_eq!(config.button_url, "https://frieren.fandom.com/wiki/Frieren");
    }

    #[test]
    fn test_presence_rejects_non_numeric_client_id() {
        let err = PresenceConfig::from_lookup(vars(&[("DISCORD_CLIENT_ID", "abc")])).unwrap_err();
        assert!(matches!(err, GuildLoggerError::Config(_)));
    }
}
