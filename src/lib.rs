//! Blocking client for the Telegram Bot HTTP API.
//!
//! Every action is a single request to `https://api.telegram.org/bot<token>/<method>`;
//! the `ok` flag of the reply decides between the `result` payload and
//! [`TelegramError::Api`].
//!
//! ```rust,no_run
//! use tgbot_client::{Bot, TelegramBot};
//!
//! let bot = TelegramBot::new("BOT_TOKEN")?;
//! bot.send_message("12345", "hello")?;
//! # Ok::<(), tgbot_client::TelegramError>(())
//! ```

pub mod config;
pub mod telegram;

pub use config::{ConfigError, Settings};
pub use telegram::api::TelegramBot;
pub use telegram::inbox::{FileKind, Inbox, IncomingMessage, MessageContent};
pub use telegram::request::{ApiRequest, Method};
pub use telegram::transport::{HttpTransport, Transport};
pub use telegram::{Bot, InputFile, TelegramError};
