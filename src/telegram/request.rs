use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value};

use super::TelegramError;

/// Bot API methods this client knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    SendMessage,
    SendPhoto,
    SendAudio,
    SendVideo,
    SendDocument,
    GetUpdates,
    GetFile,
    DeleteMessage,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::SendMessage,
        Method::SendPhoto,
        Method::SendAudio,
        Method::SendVideo,
        Method::SendDocument,
        Method::GetUpdates,
        Method::GetFile,
        Method::DeleteMessage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::SendMessage => "sendMessage",
            Method::SendPhoto => "sendPhoto",
            Method::SendAudio => "sendAudio",
            Method::SendVideo => "sendVideo",
            Method::SendDocument => "sendDocument",
            Method::GetUpdates => "getUpdates",
            Method::GetFile => "getFile",
            Method::DeleteMessage => "deleteMessage",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media payload for `sendPhoto` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFile {
    /// A `file_id` already stored on Telegram's servers, or an HTTP URL.
    Reference(String),
    /// Bytes uploaded under the given file name.
    Memory { file_name: String, bytes: Vec<u8> },
    /// A local file read when the request is dispatched.
    Path(PathBuf),
}

impl InputFile {
    pub fn reference(file_ref: impl Into<String>) -> Self {
        InputFile::Reference(file_ref.into())
    }

    pub fn memory(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        InputFile::Memory {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        InputFile::Path(path.into())
    }
}

impl From<&str> for InputFile {
    fn from(file_ref: &str) -> Self {
        InputFile::Reference(file_ref.to_string())
    }
}

impl From<String> for InputFile {
    fn from(file_ref: String) -> Self {
        InputFile::Reference(file_ref)
    }
}

/// One outbound call: method, parameters and at most one attached media field.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    params: Map<String, Value>,
    media: Option<(String, InputFile)>,
}

impl ApiRequest {
    pub fn new(method: Method) -> Self {
        ApiRequest {
            method,
            params: Map::new(),
            media: None,
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn media(mut self, field: &str, file: InputFile) -> Self {
        self.media = Some((field.to_string(), file));
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// JSON when only plain parameters are present, multipart once media is attached.
    pub fn into_body(self) -> Result<RequestBody, TelegramError> {
        let Some((field, file)) = self.media else {
            return Ok(RequestBody::Json(self.params));
        };

        let mut form = MultipartBody::default();
        for (name, value) in self.params {
            form.fields.push((name, form_value(value)));
        }
        match file {
            InputFile::Reference(file_ref) => form.fields.push((field, file_ref)),
            InputFile::Memory { file_name, bytes } => form.files.push(FilePart {
                field,
                file_name,
                bytes,
            }),
            InputFile::Path(path) => {
                let bytes = fs::read(&path)?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload".to_string());
                form.files.push(FilePart {
                    field,
                    file_name,
                    bytes,
                });
            }
        }
        Ok(RequestBody::Multipart(form))
    }
}

fn form_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Encoded request body handed to a [`Transport`](super::Transport).
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Map<String, Value>),
    Multipart(MultipartBody),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartBody {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_plain_params_encode_as_json() {
        let body = ApiRequest::new(Method::SendMessage)
            .param("chat_id", "12345")
            .param("text", "hello")
            .into_body()
            .unwrap();
        match body {
            RequestBody::Json(map) => {
                assert_eq!(map["chat_id"], "12345");
                assert_eq!(map["text"], "hello");
            }
            other => panic!("expected JSON body, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_media_is_a_form_field() {
        let body = ApiRequest::new(Method::SendVideo)
            .param("chat_id", "12345")
            .media("video", InputFile::reference("BAACAgQ"))
            .into_body()
            .unwrap();
        let RequestBody::Multipart(form) = body else {
            panic!("expected multipart body");
        };
        assert_eq!(form.field("chat_id"), Some("12345"));
        assert_eq!(form.field("video"), Some("BAACAgQ"));
        assert!(form.files.is_empty());
    }

    #[test]
    fn test_non_string_params_are_stringified_in_forms() {
        let body = ApiRequest::new(Method::SendAudio)
            .param("chat_id", 42)
            .media("audio", InputFile::memory("a.mp3", vec![1, 2, 3]))
            .into_body()
            .unwrap();
        let RequestBody::Multipart(form) = body else {
            panic!("expected multipart body");
        };
        assert_eq!(form.field("chat_id"), Some("42"));
        assert_eq!(form.files.len(), 1);
        assert_eq!(form.files[0].field, "audio");
        assert_eq!(form.files[0].file_name, "a.mp3");
        assert_eq!(form.files[0].bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_path_media_is_read_at_encoding() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF").unwrap();
        let body = ApiRequest::new(Method::SendDocument)
            .param("chat_id", "1")
            .media("document", InputFile::path(file.path()))
            .into_body()
            .unwrap();
        let RequestBody::Multipart(form) = body else {
            panic!("expected multipart body");
        };
        assert_eq!(form.files[0].bytes, b"%PDF".to_vec());
        assert_eq!(
            form.files[0].file_name,
            file.path().file_name().unwrap().to_string_lossy()
        );
    }

    #[test]
    fn test_missing_upload_path_is_io_error() {
        let err = ApiRequest::new(Method::SendPhoto)
            .media("photo", InputFile::path("/definitely/not/here.jpg"))
            .into_body()
            .unwrap_err();
        assert!(matches!(err, TelegramError::Io(_)));
    }
}
