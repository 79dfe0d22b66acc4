//! Frozen copy of a request, taken right before transmission.

use bytes::Bytes;
use http::header::HeaderName;
use http::Version;
use serde_json::Value;
use url::Url;

use super::encoding::header_value;
use crate::cookies::merge_cookie_header;
use crate::error::{FormatError, RequestError, SendError};
use crate::format::{content_type, FormatterRegistry};
use crate::params::{render, render_all};
use crate::request::Request;

const OCTET_STREAM: &str = "application/octet-stream";

/// What was actually put on the wire for one send.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSnapshot {
    method: String,
    url: Url,
    version: Version,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl RequestSnapshot {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of a header, name matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Freeze `request`: resolve the URL, render headers, attach cookies
    /// from the jar and serialize the body.
    pub(crate) fn capture(
        request: &Request,
        formatters: &FormatterRegistry,
        user_agent: Option<&str>,
    ) -> Result<Self, SendError> {
        let url = request.full_url()?;
        let method = request.http_method().to_string();
        if http::Method::from_bytes(method.as_bytes()).is_err() {
            return Err(RequestError::InvalidMethod(method).into());
        }

        let cookies_enabled = request.cookie_mode().is_enabled();
        let mut headers = Vec::with_capacity(request.headers().len() + 3);
        let mut explicit_cookie = None;
        for (name, value) in request.headers().iter() {
            if cookies_enabled && name.eq_ignore_ascii_case("cookie") {
                explicit_cookie = Some(render(value));
                continue;
            }
            for rendered in render_all(value) {
                headers.push((name.to_string(), rendered));
            }
        }

        if cookies_enabled {
            let jar = request.cookie_jar().cookies_for(&url);
            if let Some(cookie) = merge_cookie_header(explicit_cookie.as_deref(), &jar) {
                headers.push(("Cookie".to_string(), cookie));
            }
        }

        let body = encode_body(request, formatters)?;
        if body.is_some() && !has_header(&headers, "content-type") {
            let fallback = if request.body().raw().is_some() {
                OCTET_STREAM
            } else {
                content_type::FORM
            };
            headers.push(("Content-Type".to_string(), fallback.to_string()));
        }

        if let Some(agent) = user_agent {
            if !has_header(&headers, "user-agent") {
                headers.push(("User-Agent".to_string(), agent.to_string()));
            }
        }

        Ok(Self {
            method,
            url,
            version: request.version(),
            headers,
            body,
        })
    }

    /// Build the message handed to the engine.
    ///
    /// Header values go through the Latin-1 transfer. Names or values that
    /// are not valid on the wire are skipped with a warning.
    pub fn to_message(&self) -> Result<http::Request<Bytes>, SendError> {
        let method = http::Method::from_bytes(self.method.as_bytes())
            .map_err(|_| SendError::from(RequestError::InvalidMethod(self.method.clone())))?;

        let mut target = self.url.clone();
        target.set_fragment(None);

        let mut message = http::Request::builder()
            .method(method)
            .uri(target.as_str())
            .version(self.version)
            .body(self.body.clone().unwrap_or_default())
            .map_err(|e| SendError::InvalidRequest(e.to_string()))?;

        let wire_headers = message.headers_mut();
        for (name, value) in &self.headers {
            let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
                tracing::warn!(header = %name, "skipping header with invalid name");
                continue;
            };
            match header_value(value) {
                Ok(header) => {
                    wire_headers.append(header_name, header);
                }
                Err(_) => {
                    tracing::warn!(header = %name, "skipping header with invalid value");
                }
            }
        }
        Ok(message)
    }
}

fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
}

fn encode_body(
    request: &Request,
    formatters: &FormatterRegistry,
) -> Result<Option<Bytes>, FormatError> {
    let body = request.body();
    if let Some(raw) = body.raw() {
        return Ok((!raw.is_empty()).then(|| raw.clone()));
    }

    let fields: Vec<(&str, &Value)> = body.fields().iter().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    let content_type = body
        .content_type()
        .unwrap_or_else(|| content_type::FORM.to_string());
    formatters.format(&content_type, &fields).map(Some)
}
