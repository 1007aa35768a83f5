use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the config was read from, if anywhere.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
    pub telegram: TelegramConfig,
    pub reliability: ReliabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token. Usually supplied through `BOT_TOKEN` instead of the file.
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Long-poll timeout passed to `getUpdates`.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base_url: default_api_base_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityConfig {
    #[serde(default = "default_channel_initial_backoff_secs")]
    pub channel_initial_backoff_secs: u64,
    #[serde(default = "default_channel_max_backoff_secs")]
    pub channel_max_backoff_secs: u64,
    /// Extra attempts for a failed checklist edit (0 = no retry).
    #[serde(default = "default_edit_retries")]
    pub edit_retries: u32,
    #[serde(default = "default_edit_retry_delay_ms")]
    pub edit_retry_delay_ms: u64,
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            channel_initial_backoff_secs: default_channel_initial_backoff_secs(),
            channel_max_backoff_secs: default_channel_max_backoff_secs(),
            edit_retries: default_edit_retries(),
            edit_retry_delay_ms: default_edit_retry_delay_ms(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_TELEGRAM_API_BASE_URL.to_string()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_channel_initial_backoff_secs() -> u64 {
    2
}

fn default_channel_max_backoff_secs() -> u64 {
    60
}

fn default_edit_retries() -> u32 {
    2
}

fn default_edit_retry_delay_ms() -> u64 {
    500
}
