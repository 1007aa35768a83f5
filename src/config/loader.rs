use super::Config;
use crate::error::ConfigError;
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

const TOKEN_VARS: [&str; 2] = ["SHIFTCHECK_BOT_TOKEN", "BOT_TOKEN"];

impl Config {
    /// Load `.env`, the config file (explicit path, or `~/.shiftcheck/config.toml`
    /// when present), then environment overrides, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            tracing::warn!("ignoring unreadable .env file: {e}");
        }

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        let mut config: Config = toml::from_str(&contents)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = TOKEN_VARS
            .iter()
            .find_map(|key| lookup(*key).filter(|v| !v.trim().is_empty()))
        {
            self.telegram.bot_token = Some(token.trim().to_string());
        }

        if let Some(url) = lookup("SHIFTCHECK_API_BASE_URL")
            && !url.is_empty()
        {
            self.telegram.api_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(timeout) = lookup("SHIFTCHECK_POLL_TIMEOUT_SECS")
            && let Ok(timeout) = timeout.parse::<u64>()
        {
            self.telegram.poll_timeout_secs = timeout;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_token().is_none() {
            return Err(ConfigError::MissingCredential);
        }
        if !(1..=50).contains(&self.telegram.poll_timeout_secs) {
            return Err(ConfigError::Validation(format!(
                "telegram.poll_timeout_secs must be between 1 and 50, got {}",
                self.telegram.poll_timeout_secs
            )));
        }
        if self.telegram.api_base_url.is_empty() {
            return Err(ConfigError::Validation(
                "telegram.api_base_url must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// The configured token, if it is non-blank.
    pub fn bot_token(&self) -> Option<&str> {
        self.telegram
            .bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

fn default_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|u| u.home_dir().join(".shiftcheck").join("config.toml"))
}
