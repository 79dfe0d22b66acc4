//! Normalized response entity.
//!
//! A `Response` is produced by every send, successful or not. Failures carry
//! a [`SendError`] and the status sentinel [`NO_STATUS`] instead of being
//! returned as `Err`.

use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::cookies::Cookie;
use crate::error::SendError;
use crate::transport::RequestSnapshot;

/// Status code of a response that never arrived.
pub const NO_STATUS: u16 = 0;

/// Buffered response body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseBody {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct Response {
    status_code: u16,
    status_text: String,
    version: String,
    headers: Vec<(String, String)>,
    body: ResponseBody,
    cookies: Vec<Cookie>,
    error: Option<SendError>,
    snapshot: Option<Arc<RequestSnapshot>>,
}

impl Response {
    /// A response that came back from the server.
    pub fn received(
        status_code: u16,
        status_text: impl Into<String>,
        version: impl Into<String>,
        headers: Vec<(String, String)>,
        body: Bytes,
    ) -> Self {
        let content_type = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.clone());
        Self {
            status_code,
            status_text: status_text.into(),
            version: version.into(),
            headers,
            body: ResponseBody {
                content_type,
                bytes: body,
            },
            cookies: Vec::new(),
            error: None,
            snapshot: None,
        }
    }

    /// A send that failed before a well-formed response existed.
    pub fn failed(error: SendError) -> Self {
        Self {
            status_code: NO_STATUS,
            status_text: String::new(),
            version: String::new(),
            headers: Vec::new(),
            body: ResponseBody::default(),
            cookies: Vec::new(),
            error: Some(error),
            snapshot: None,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Typed status; `None` for failed sends.
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status_code).ok()
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Rendered as `SCHEME/major.minor`, e.g. `HTTP/1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Every header value as its own pair, in wire order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of a header, name matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_all(name).next()
    }

    pub fn header_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + use<'a, 'n> {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn content_type(&self) -> Option<&str> {
        self.body.content_type.as_deref()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body.bytes
    }

    /// Body decoded as UTF-8, invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body.bytes).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body.bytes)
    }

    /// Cookies the jar holds for the request URI after this response was merged.
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// No error and a 2xx status.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status_code)
    }

    pub fn error(&self) -> Option<&SendError> {
        self.error.as_ref()
    }

    /// The request exactly as it was sent.
    pub fn snapshot(&self) -> Option<&RequestSnapshot> {
        self.snapshot.as_deref()
    }

    /// Turn a failed send back into an `Err`. HTTP error statuses stay `Ok`.
    pub fn into_result(self) -> Result<Response, SendError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }

    pub(crate) fn set_cookies(&mut self, cookies: Vec<Cookie>) {
        self.cookies = cookies;
    }

    pub(crate) fn attach_snapshot(&mut self, snapshot: Arc<RequestSnapshot>) {
        self.snapshot = Some(snapshot);
    }
}
