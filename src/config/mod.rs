use std::path::PathBuf;

use thiserror::Error;

pub mod settings;

pub use settings::Settings;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file {} not found", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Bot token is missing (set API_KEY or TG_BOT_TOKEN)")]
    MissingToken,

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
}
