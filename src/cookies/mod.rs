//! Cookie propagation.
//!
//! # Data Flow
//! ```text
//! snapshot construction
//!     → jar.cookies_for(url) merged with any explicit Cookie header
//! response normalization
//!     → Set-Cookie values → jar.merge_from(resolved_uri)
//!     → jar.cookies_for(resolved_uri) copied onto the response
//! ```
//!
//! # Design Decisions
//! - Jars are keyed by origin (scheme, host, port); Domain and Path are not modelled
//! - The default jar is process-wide; any request may carry its own instead
//! - Jars synchronize internally, callers never lock

pub mod jar;

use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};
use url::Url;

pub use jar::LocalCookieJar;

/// Whether a request takes part in cookie propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieMode {
    /// No jar reads or merges; an explicit `Cookie` header is sent untouched.
    Disabled,
    /// Attach jar cookies and merge `Set-Cookie` responses into the jar.
    #[default]
    Enabled,
}

impl CookieMode {
    pub fn is_enabled(self) -> bool {
        self == CookieMode::Enabled
    }
}

/// A single name/value cookie pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Outcome of parsing one `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetCookie {
    Store(Cookie),
    Expire(String),
}

impl SetCookie {
    /// Parse `name=value; Attr=...`. Only `Max-Age` is interpreted.
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let value = value.trim().trim_matches('"');

        let expired = parts.any(|attr| {
            let Some((key, val)) = attr.split_once('=') else {
                return false;
            };
            key.trim().eq_ignore_ascii_case("max-age")
                && val.trim().parse::<i64>().is_ok_and(|age| age <= 0)
        });

        Some(if expired {
            SetCookie::Expire(name.to_string())
        } else {
            SetCookie::Store(Cookie::new(name, value))
        })
    }
}

/// A store of cookies keyed by origin.
pub trait CookieJar: Send + Sync {
    /// Merge raw `Set-Cookie` header values received from `uri`.
    fn merge_from(&self, uri: &Url, set_cookies: &[String]);

    /// Cookies that apply to `uri`, in the order they were first stored.
    fn cookies_for(&self, uri: &Url) -> Vec<Cookie>;

    /// The `Cookie` header value for `uri`, if any cookie applies.
    fn header_for(&self, uri: &Url) -> Option<String> {
        let cookies = self.cookies_for(uri);
        if cookies.is_empty() {
            None
        } else {
            Some(join_cookie_header(cookies.iter()))
        }
    }
}

/// Shared handle to a jar.
pub type SharedCookieJar = Arc<dyn CookieJar>;

static LOCAL_COOKIES: LazyLock<SharedCookieJar> =
    LazyLock::new(|| Arc::new(LocalCookieJar::new()));

/// The process-wide jar used by requests that do not carry their own.
pub fn local_cookies() -> SharedCookieJar {
    Arc::clone(&LOCAL_COOKIES)
}

/// Origin key used by jars.
pub fn origin_key(uri: &Url) -> Option<String> {
    let origin = uri.origin();
    origin
        .is_tuple()
        .then(|| origin.ascii_serialization())
}

/// Combine an explicit `Cookie` header with jar cookies.
///
/// Explicit pairs come first and win on name clashes.
pub fn merge_cookie_header(explicit: Option<&str>, jar: &[Cookie]) -> Option<String> {
    let mut pairs: Vec<Cookie> = explicit
        .map(parse_cookie_header)
        .unwrap_or_default();
    for cookie in jar {
        if !pairs.iter().any(|existing| existing.name == cookie.name) {
            pairs.push(cookie.clone());
        }
    }
    if pairs.is_empty() {
        None
    } else {
        Some(join_cookie_header(pairs.iter()))
    }
}

/// Split a `Cookie` request header into pairs.
pub fn parse_cookie_header(header: &str) -> Vec<Cookie> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| Cookie::new(name, value.trim()))
        })
        .collect()
}

fn join_cookie_header<'a>(cookies: impl Iterator<Item = &'a Cookie>) -> String {
    cookies
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}
