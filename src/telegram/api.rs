use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use serde_json::Value;

use super::request::{ApiRequest, InputFile, Method};
use super::response::ApiResponse;
use super::transport::{HttpTransport, Transport};
use super::{Bot, TelegramError};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub struct TelegramBot<T: Transport = HttpTransport> {
    api_url: String,
    base_url: String,
    token: String,
    transport: T,
}

impl TelegramBot<HttpTransport> {
    pub fn new(token: &str) -> Result<Self, TelegramError> {
        Self::with_timeout(token, Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
    }

    pub fn with_timeout(token: &str, timeout: Option<Duration>) -> Result<Self, TelegramError> {
        Ok(Self::with_transport(
            DEFAULT_API_URL,
            token,
            HttpTransport::new(timeout)?,
        ))
    }
}

impl<T: Transport> TelegramBot<T> {
    /// `api_url` is the server root, e.g. `https://api.telegram.org` or a local Bot API server.
    pub fn with_transport(api_url: &str, token: &str, transport: T) -> Self {
        let api_url = api_url.trim_end_matches('/').to_string();
        TelegramBot {
            base_url: format!("{}/bot{}", api_url, token),
            api_url,
            token: token.to_string(),
            transport,
        }
    }

    pub fn endpoint(&self, method: Method) -> String {
        format!("{}/{}", self.base_url, method)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send one request and unwrap the Bot API envelope.
    pub fn execute(&self, request: ApiRequest) -> Result<Value, TelegramError> {
        let method = request.method();
        let url = self.endpoint(method);
        debug!("Calling {}", method);

        let reply = self.transport.post(&url, request.into_body()?)?;
        let result = ApiResponse::parse(reply.status, &reply.body)?.into_result();
        if let Err(e) = &result {
            debug!("{} failed: {}", method, e);
        }
        result
    }

    fn send_media(
        &self,
        method: Method,
        field: &str,
        chat_id: &str,
        file: InputFile,
    ) -> Result<Value, TelegramError> {
        info!("Sending {} to {}", field, chat_id);
        self.execute(
            ApiRequest::new(method)
                .param("chat_id", chat_id)
                .media(field, file),
        )
    }
}

impl<T: Transport> Bot for TelegramBot<T> {
    fn send_message(&self, chat_id: &str, text: &str) -> Result<Value, TelegramError> {
        info!("Sending message to {}", chat_id);
        self.execute(
            ApiRequest::new(Method::SendMessage)
                .param("chat_id", chat_id)
                .param("text", text),
        )
    }

    fn send_photo(
        &self,
        chat_id: &str,
        photo: impl Into<InputFile>,
    ) -> Result<Value, TelegramError> {
        self.send_media(Method::SendPhoto, "photo", chat_id, photo.into())
    }

    fn send_audio(
        &self,
        chat_id: &str,
        audio: impl Into<InputFile>,
    ) -> Result<Value, TelegramError> {
        self.send_media(Method::SendAudio, "audio", chat_id, audio.into())
    }

    fn send_video(
        &self,
        chat_id: &str,
        video: impl Into<InputFile>,
    ) -> Result<Value, TelegramError> {
        self.send_media(Method::SendVideo, "video", chat_id, video.into())
    }

    fn send_document(
        &self,
        chat_id: &str,
        document: impl Into<InputFile>,
    ) -> Result<Value, TelegramError> {
        self.send_media(Method::SendDocument, "document", chat_id, document.into())
    }

    fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Value>, TelegramError> {
        let mut request = ApiRequest::new(Method::GetUpdates);
        if let Some(offset) = offset {
            request = request.param("offset", offset);
        }
        match self.execute(request)? {
            Value::Array(updates) => {
                debug!("Received {} updates", updates.len());
                Ok(updates)
            }
            other => Err(TelegramError::transport(format!(
                "getUpdates result is not a list: {}",
                other
            ))),
        }
    }

    fn get_file(&self, file_id: &str) -> Result<Value, TelegramError> {
        self.execute(ApiRequest::new(Method::GetFile).param("file_id", file_id))
    }

    fn get_file_url(&self, file_id: &str) -> Result<String, TelegramError> {
        let file = self.get_file(file_id)?;
        let file_path = file
            .get("file_path")
            .and_then(|p| p.as_str())
            .ok_or_else(|| TelegramError::transport("getFile result has no file_path"))?;

        Ok(format!(
            "{}/file/bot{}/{}",
            self.api_url, self.token, file_path
        ))
    }

    fn download_file(&self, file_id: &str, dir: &Path) -> Result<PathBuf, TelegramError> {
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} folder not found", dir.display()),
            )
            .into());
        }

        let url = self.get_file_url(file_id)?;
        let file_name = url.rsplit('/').next().unwrap_or(file_id).to_string();
        let bytes = self.transport.download(&url)?;
        let target = dir.join(file_name);
        fs::write(&target, &bytes)?;
        info!("Downloaded {} to {}", file_id, target.display());
        Ok(target)
    }

    fn delete_message(&self, chat_id: &str, message_id: i64) -> Result<bool, TelegramError> {
        let result = self.execute(
            ApiRequest::new(Method::DeleteMessage)
                .param("chat_id", chat_id)
                .param("message_id", message_id),
        )?;
        result.as_bool().ok_or_else(|| {
            TelegramError::transport(format!("deleteMessage result is not a bool: {}", result))
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::telegram::request::RequestBody;
    use crate::telegram::transport::mock::{MockReply, MockTransport};

    const TOKEN: &str = "123456:TEST_API_KEY";

    fn bot(transport: MockTransport) -> TelegramBot<MockTransport> {
        TelegramBot::with_transport(DEFAULT_API_URL, TOKEN, transport)
    }

    /// Every action, each run once against the given bot.
    fn call_all(bot: &TelegramBot<MockTransport>) -> Vec<(Method, Result<Value, TelegramError>)> {
        vec![
            (Method::SendMessage, bot.send_message("12345", "hello")),
            (Method::SendPhoto, bot.send_photo("12345", "AgACAgQ")),
            (Method::SendAudio, bot.send_audio("12345", "CQACAgQ")),
            (Method::SendVideo, bot.send_video("12345", "BAACAgQ")),
            (Method::SendDocument, bot.send_document("12345", "BQACAgU")),
            (
                Method::GetUpdates,
                bot.get_updates(None).map(Value::Array),
            ),
            (Method::GetFile, bot.get_file("BQACAgU")),
        ]
    }

    #[test]
    fn test_telegram_bot_new() {
        let bot = TelegramBot::new(TOKEN).unwrap();
        assert_eq!(bot.api_url, "https://api.telegram.org");
        assert_eq!(bot.base_url, "https://api.telegram.org/bot123456:TEST_API_KEY");
        assert_eq!(bot.token, TOKEN);
        assert_eq!(bot.transport().timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_endpoint_for_every_method() {
        let bot = bot(MockTransport::ok(json!(true)));
        for method in Method::ALL {
            assert_eq!(
                bot.endpoint(method),
                format!("https://api.telegram.org/bot{}/{}", TOKEN, method.as_str())
            );
        }
    }

    #[test]
    fn test_custom_api_url_trailing_slash() {
        let bot = TelegramBot::with_transport("http://localhost:8081/", "t", MockTransport::ok(json!(1)));
        assert_eq!(bot.endpoint(Method::GetUpdates), "http://localhost:8081/bott/getUpdates");
    }

    #[test]
    fn test_requests_hit_their_own_endpoint() {
        let bot = bot(MockTransport::ok(json!([])));
        let results = call_all(&bot);
        let posts = bot.transport().posts.borrow();
        assert_eq!(posts.len(), results.len());
        for ((method, _), (url, _)) in results.iter().zip(posts.iter()) {
            assert_eq!(url, &bot.endpoint(*method));
        }
    }

    #[test]
    fn test_ok_result_is_returned_unchanged() {
        let payload = json!([{"message_id": 80, "chat": {"id": 12345}, "text": "hi"}]);
        let bot = bot(MockTransport::ok(payload.clone()));
        for (method, result) in call_all(&bot) {
            assert_eq!(result.unwrap(), payload, "{}", method);
        }
    }

    #[test]
    fn test_api_error_carries_code_and_description() {
        let bot = bot(MockTransport::bad_request());
        for (method, result) in call_all(&bot) {
            match result {
                Err(TelegramError::Api { code, description }) => {
                    assert_eq!(code, 400, "{}", method);
                    assert_eq!(description, "Bad Request", "{}", method);
                }
                other => panic!("{}: expected ApiError, got {:?}", method, other),
            }
        }
        let err = bot.delete_message("12345", 174).unwrap_err();
        assert_eq!(err.api_code(), Some(400));
    }

    #[test]
    fn test_connection_failure_is_transport_error() {
        let bot = bot(MockTransport::refused());
        for (method, result) in call_all(&bot) {
            let err = result.unwrap_err();
            assert!(err.is_transport(), "{}: {:?}", method, err);
            assert_eq!(err.api_code(), None);
        }
        assert!(bot.delete_message("12345", 174).unwrap_err().is_transport());
    }

    #[test]
    fn test_send_message_posts_json() {
        let bot = bot(MockTransport::ok(json!({"message_id": 81})));
        let result = bot.send_message("12345", "hello").unwrap();
        assert_eq!(result, json!({"message_id": 81}));

        let (url, body) = bot.transport().last_post();
        assert_eq!(url, format!("https://api.telegram.org/bot{}/sendMessage", TOKEN));
        let RequestBody::Json(params) = body else {
            panic!("sendMessage must be JSON encoded");
        };
        assert_eq!(Value::Object(params), json!({"chat_id": "12345", "text": "hello"}));
    }

    #[test]
    fn test_send_photo_posts_multipart_reference() {
        let bot = bot(MockTransport::ok(json!({"message_id": 82})));
        bot.send_photo("12345", "<file-ref>").unwrap();

        let (url, body) = bot.transport().last_post();
        assert!(url.ends_with("/sendPhoto"));
        let RequestBody::Multipart(form) = body else {
            panic!("sendPhoto must be multipart encoded");
        };
        assert_eq!(form.field("chat_id"), Some("12345"));
        assert_eq!(form.field("photo"), Some("<file-ref>"));
    }

    #[test]
    fn test_send_document_uploads_bytes() {
        let bot = bot(MockTransport::ok(json!({"message_id": 83})));
        bot.send_document("5542167123", InputFile::memory("Cargo.toml", b"[package]".to_vec()))
            .unwrap();

        let (_, body) = bot.transport().last_post();
        let RequestBody::Multipart(form) = body else {
            panic!("sendDocument must be multipart encoded");
        };
        assert_eq!(form.files[0].field, "document");
        assert_eq!(form.files[0].file_name, "Cargo.toml");
    }

    #[test]
    fn test_get_updates_with_offset() {
        let bot = bot(MockTransport::ok(json!([{"update_id": 1}, {"update_id": 2}])));
        let updates = bot.get_updates(Some(-1)).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1]["update_id"], 2);

        let (_, body) = bot.transport().last_post();
        assert_eq!(body, RequestBody::Json(json!({"offset": -1}).as_object().unwrap().clone()));
    }

    #[test]
    fn test_get_updates_rejects_non_list() {
        let bot = bot(MockTransport::ok(json!({"update_id": 1})));
        assert!(bot.get_updates(None).unwrap_err().is_transport());
    }

    #[test]
    fn test_malformed_body_is_transport_error() {
        let bot = bot(MockTransport::new(vec![MockReply::Raw(
            502,
            "<html>Bad Gateway</html>".to_string(),
        )]));
        let err = bot.send_message("12345", "hello").unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_telegram_bot_get_file_url() {
        let bot = bot(MockTransport::ok(
            json!({"file_id": "BQACAgU", "file_path": "documents/file_3.pdf"}),
        ));
        let url = bot.get_file_url("BQACAgU").unwrap();
        assert_eq!(
            url,
            format!("https://api.telegram.org/file/bot{}/documents/file_3.pdf", TOKEN)
        );
    }

    #[test]
    fn test_telegram_bot_delete_message() {
        let bot = bot(MockTransport::ok(json!(true)));
        assert!(bot.delete_message("5542167123", 174).unwrap());

        let (_, body) = bot.transport().last_post();
        let RequestBody::Json(params) = body else {
            panic!("deleteMessage must be JSON encoded");
        };
        assert_eq!(params["message_id"], 174);
    }

    #[test]
    fn test_delete_message_rejects_non_bool_result() {
        let bot = bot(MockTransport::ok(json!({"weird": 1})));
        let err = bot.delete_message("5542167123", 174).unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("not a bool"));
    }

    #[test]
    fn test_download_file_writes_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut transport = MockTransport::ok(json!({"file_id": "AgAC", "file_path": "photos/file_0.jpg"}));
        transport.file_bytes = b"\xff\xd8\xff".to_vec();
        let bot = bot(transport);

        let path = bot.download_file("AgAC", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("file_0.jpg"));
        assert_eq!(fs::read(&path).unwrap(), b"\xff\xd8\xff".to_vec());
        assert_eq!(
            bot.transport().downloads.borrow().as_slice(),
            [format!("https://api.telegram.org/file/bot{}/photos/file_0.jpg", TOKEN)]
        );
    }

    #[test]
    fn test_download_file_missing_dir() {
        let bot = bot(MockTransport::ok(json!({"file_path": "photos/file_0.jpg"})));
        let err = bot
            .download_file("AgAC", Path::new("/no/such/download/dir"))
            .unwrap_err();
        assert!(matches!(err, TelegramError::Io(_)));
        assert!(bot.transport().posts.borrow().is_empty());
    }
}
