use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, multipart};

use super::TelegramError;
use super::request::RequestBody;

/// Raw HTTP answer: status plus the undecoded body.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// A single blocking HTTP exchange. No retries happen at this layer.
pub trait Transport {
    fn post(&self, url: &str, body: RequestBody) -> Result<HttpReply, TelegramError>;
    fn download(&self, url: &str) -> Result<Vec<u8>, TelegramError>;
}

/// [`Transport`] backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// `None` disables the request timeout entirely.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TelegramError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpTransport { client, timeout })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, body: RequestBody) -> Result<HttpReply, TelegramError> {
        let request = self.client.post(url);
        let request = match body {
            RequestBody::Json(params) => request.json(&params),
            RequestBody::Multipart(form) => {
                let mut multipart_form = multipart::Form::new();
                for (name, value) in form.fields {
                    multipart_form = multipart_form.text(name, value);
                }
                for file in form.files {
                    let part = multipart::Part::bytes(file.bytes).file_name(file.file_name);
                    multipart_form = multipart_form.part(file.field, part);
                }
                request.multipart(multipart_form)
            }
        };

        let response = request.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        debug!("HTTP {} ({} bytes)", status, body.len());
        Ok(HttpReply { status, body })
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, TelegramError> {
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}
