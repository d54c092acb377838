use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Telegram Bot API errors
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The HTTP exchange could not complete, or its body was not a Bot API envelope
    #[error("HTTP request failed: {0}")]
    Transport(#[source] BoxError),

    /// Telegram answered with `ok == false`
    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },

    /// Local filesystem failure while reading an upload or writing a download
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TelegramError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        TelegramError::Transport(err.into())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, TelegramError::Transport(_))
    }

    /// Remote `error_code`, when Telegram reported the failure.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            TelegramError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

// reqwest keeps the request URL, which carries the bot token.
impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        TelegramError::Transport(Box::new(err.without_url()))
    }
}

impl From<serde_json::Error> for TelegramError {
    fn from(err: serde_json::Error) -> Self {
        TelegramError::Transport(Box::new(err))
    }
}
