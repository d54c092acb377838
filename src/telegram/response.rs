use serde::Deserialize;
use serde_json::Value;

use super::TelegramError;

/// The envelope every Bot API method answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ApiResponse {
    /// Parse a raw HTTP body. `status` only feeds the error message.
    pub fn parse(status: u16, body: &str) -> Result<Self, TelegramError> {
        serde_json::from_str(body).map_err(|e| {
            TelegramError::transport(format!(
                "malformed response body (HTTP {}): {}",
                status, e
            ))
        })
    }

    pub fn into_result(self) -> Result<Value, TelegramError> {
        if !self.ok {
            return Err(TelegramError::Api {
                code: self.error_code.unwrap_or(0),
                description: self.description.unwrap_or_default(),
            });
        }
        self.result
            .ok_or_else(|| TelegramError::transport("response is ok but carries no result"))
    }
}
