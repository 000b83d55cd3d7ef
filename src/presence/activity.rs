use crate::config::PresenceConfig;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Activity {
    pub details: String,
    pub state: String,
    pub timestamps: Timestamps,
    pub assets: Assets,
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Timestamps {
    /// Unix epoch milliseconds
    pub start: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Assets {
    pub large_image: String,
    pub large_text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Button {
    pub label: String,
    pub url: String,
}

impl Activity {
    pub fn from_config(config: &PresenceConfig, started_at_ms: i64) -> Self {
        Self {
            details: config.details.clone(),
            state: config.state.clone(),
            timestamps: Timestamps {
                start: started_at_ms,
            },
            assets: Assets {
                large_image: config.large_image_key.clone(),
                large_text: config.large_image_text.clone(),
            },
            buttons: vec![Button {
                label: config.button_label.clone(),
                url: config.button_url.clone(),
            }],
        }
    }
}
