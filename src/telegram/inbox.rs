//! One-shot check for a fresh incoming message.
//!
//! [`Inbox`] asks for the newest pending update only (`offset = -1`) and
//! reports it once. It keeps the bookkeeping the client itself must not hold:
//! the last message id handed out and the chat it came from.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::Value;

use super::{Bot, TelegramError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Photo,
    Voice,
    Video,
    Document,
}

impl FileKind {
    const ALL: [FileKind; 4] = [
        FileKind::Photo,
        FileKind::Voice,
        FileKind::Video,
        FileKind::Document,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Photo => "photo",
            FileKind::Voice => "voice",
            FileKind::Video => "video",
            FileKind::Document => "document",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    File {
        kind: FileKind,
        file_id: String,
        caption: Option<String>,
    },
    Unsupported,
}

impl MessageContent {
    /// Text wins over media; photos arrive as a list of sizes and the last one is kept.
    pub fn classify(message: &Value) -> Self {
        if let Some(text) = message.get("text").and_then(Value::as_str) {
            return MessageContent::Text(text.to_string());
        }

        for kind in FileKind::ALL {
            let Some(field) = message.get(kind.label()) else {
                continue;
            };
            let file = match field {
                Value::Array(sizes) => sizes.last(),
                other => Some(other),
            };
            if let Some(file_id) = file
                .and_then(|f| f.get("file_id"))
                .and_then(Value::as_str)
            {
                return MessageContent::File {
                    kind,
                    file_id: file_id.to_string(),
                    caption: message
                        .get("caption")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                };
            }
        }

        warn!("No accepted message type detected");
        MessageContent::Unsupported
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat_id: i64,
    pub date: DateTime<Utc>,
    pub content: MessageContent,
}

pub struct Inbox<'a, B: Bot> {
    bot: &'a B,
    last_message_id: Option<i64>,
    chat_id: Option<i64>,
}

impl<'a, B: Bot> Inbox<'a, B> {
    pub fn new(bot: &'a B) -> Self {
        Inbox {
            bot,
            last_message_id: None,
            chat_id: None,
        }
    }

    /// Chat of the last message returned by [`Inbox::check_new_message`].
    pub fn chat_id(&self) -> Option<i64> {
        self.chat_id
    }

    pub fn last_message_id(&self) -> Option<i64> {
        self.last_message_id
    }

    /// Returns the newest message if it is not older than `reference_time`
    /// and has not been returned before.
    pub fn check_new_message(
        &mut self,
        reference_time: DateTime<Utc>,
    ) -> Result<Option<IncomingMessage>, TelegramError> {
        let updates = self.bot.get_updates(Some(-1))?;
        let Some(message) = updates.last().and_then(|u| u.get("message")) else {
            debug!("No pending message");
            return Ok(None);
        };

        let message_id = int_field(message, &["message_id"])?;
        let chat_id = int_field(message, &["chat", "id"])?;
        let date = DateTime::from_timestamp(int_field(message, &["date"])?, 0)
            .ok_or_else(|| TelegramError::transport("message date out of range"))?;

        if date < reference_time {
            debug!("Message {} is older than {}", message_id, reference_time);
            return Ok(None);
        }
        if self.last_message_id == Some(message_id) {
            return Ok(None);
        }

        self.last_message_id = Some(message_id);
        self.chat_id = Some(chat_id);
        let content = MessageContent::classify(message);
        info!("New message {} from chat {}: {:?}", message_id, chat_id, content);
        Ok(Some(IncomingMessage {
            message_id,
            chat_id,
            date,
            content,
        }))
    }
}

fn int_field(message: &Value, path: &[&str]) -> Result<i64, TelegramError> {
    path.iter()
        .try_fold(message, |v, key| v.get(*key))
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            TelegramError::transport(format!("update message has no `{}`", path.join(".")))
        })
}
