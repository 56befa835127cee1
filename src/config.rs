use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_DATABASE_PATH: &str = "data/subscribers.db";
pub const DEFAULT_BROADCAST_DELAY_MS: u64 = 100;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

/// Runtime configuration, built once at startup and shared with the handlers.
#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub admin_id: String,
    pub database_path: PathBuf,
    /// Pause between two consecutive broadcast sends. Zero disables pacing.
    pub broadcast_delay: Duration,
    /// `None` unless `GEMINI_API_KEY` is set.
    pub gemini: Option<GeminiConfig>,
}

/// Loads a `.env` file from the working directory if there is one. Returns
/// the path that was loaded.
pub fn load_environment() -> Result<Option<PathBuf>, dotenv::Error> {
    match dotenv::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bot_token = non_empty("TELOXIDE_TOKEN")
            .or_else(|| non_empty("BOT_TOKEN"))
            .ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;

        let admin_id = non_empty("ADMIN_ID").ok_or(ConfigError::Missing("ADMIN_ID"))?;

        let database_path = non_empty("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let broadcast_delay = match non_empty("BROADCAST_DELAY_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::Invalid {
                    key: "BROADCAST_DELAY_MS",
                    value: raw,
                })?,
            None => Duration::from_millis(DEFAULT_BROADCAST_DELAY_MS),
        };

        let gemini = non_empty("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        });

        Ok(Self {
            bot_token,
            admin_id,
            database_path,
            broadcast_delay,
            gemini,
        })
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}***", visible)
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &mask_secret(&self.bot_token))
            .field("admin_id", &self.admin_id)
            .field("database_path", &self.database_path)
            .field("broadcast_delay", &self.broadcast_delay)
            .field("gemini", &self.gemini)
            .finish()
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}
