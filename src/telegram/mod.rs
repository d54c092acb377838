use std::path::{Path, PathBuf};

use serde_json::Value;

pub mod api;
pub mod error;
pub mod inbox;
pub mod request;
pub mod response;
pub mod transport;

pub use error::TelegramError;
pub use request::InputFile;

/// Blocking Bot API actions. Each call is one HTTP request, never retried.
pub trait Bot {
    fn send_message(&self, chat_id: &str, text: &str) -> Result<Value, TelegramError>;
    fn send_photo(
        &self,
        chat_id: &str,
        photo: impl Into<InputFile>,
    ) -> Result<Value, TelegramError>;
    fn send_audio(
        &self,
        chat_id: &str,
        audio: impl Into<InputFile>,
    ) -> Result<Value, TelegramError>;
    fn send_video(
        &self,
        chat_id: &str,
        video: impl Into<InputFile>,
    ) -> Result<Value, TelegramError>;
    fn send_document(
        &self,
        chat_id: &str,
        document: impl Into<InputFile>,
    ) -> Result<Value, TelegramError>;
    /// Pending updates, exactly as Telegram returns them.
    fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Value>, TelegramError>;
    fn get_file(&self, file_id: &str) -> Result<Value, TelegramError>;
    fn get_file_url(&self, file_id: &str) -> Result<String, TelegramError>;
    /// Download a stored file into `dir`, which must already exist.
    fn download_file(&self, file_id: &str, dir: &Path) -> Result<PathBuf, TelegramError>;
    fn delete_message(&self, chat_id: &str, message_id: i64) -> Result<bool, TelegramError>;
}
