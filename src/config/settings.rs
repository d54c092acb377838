use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{error, info};
use serde::Deserialize;

use super::ConfigError;
use crate::telegram::TelegramError;
use crate::telegram::api::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, TelegramBot};
use crate::telegram::transport::HttpTransport;

pub const DEFAULT_DOWNLOAD_PATH: &str = "download/";

/// Bot settings, read from a TOML file or from `TG_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(rename = "API_KEY")]
    pub api_key: String,
    #[serde(rename = "API_URL", default = "default_api_url")]
    pub api_url: String,
    #[serde(rename = "TIMEOUT_SECS", default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(rename = "DOWNLOAD_PATH", default = "default_download_path")]
    pub download_path: PathBuf,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_download_path() -> PathBuf {
    PathBuf::from(DEFAULT_DOWNLOAD_PATH)
}

impl Settings {
    pub fn new(api_key: &str) -> Self {
        Settings {
            api_key: api_key.to_string(),
            api_url: default_api_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            download_path: default_download_path(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            error!("Configuration file {} not readable: {}", path.display(), e);
            match e.kind() {
                io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
                _ => ConfigError::Io(e),
            }
        })?;
        let settings: Settings = toml::from_str(&raw)?;
        settings.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(settings)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup using the `TG_*` variable names.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("TG_BOT_TOKEN").ok_or(ConfigError::MissingToken)?;
        let mut settings = Settings::new(&api_key);
        if let Some(api_url) = lookup("TG_API_URL") {
            settings.api_url = api_url;
        }
        if let Some(timeout) = lookup("TG_TIMEOUT_SECS") {
            settings.timeout_secs = timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(timeout.clone()))?;
        }
        if let Some(path) = lookup("TG_DOWNLOAD_PATH") {
            settings.download_path = PathBuf::from(path);
        }
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(())
    }

    /// Zero disables the transport timeout.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn build_bot(&self) -> Result<TelegramBot, TelegramError> {
        let transport = HttpTransport::new(self.timeout())?;
        Ok(TelegramBot::with_transport(
            &self.api_url,
            &self.api_key,
            transport,
        ))
    }
}
