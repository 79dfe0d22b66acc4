//! In-memory cookie jar shared between concurrent sends.

use dashmap::DashMap;
use url::Url;

use super::{origin_key, Cookie, CookieJar, SetCookie};

/// Thread-safe jar keyed by origin.
///
/// Merges for one origin hold that origin's shard lock, so concurrent
/// responses from the same origin never interleave half-applied updates.
#[derive(Debug, Default)]
pub struct LocalCookieJar {
    inner: DashMap<String, Vec<Cookie>>,
}

impl LocalCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a cookie directly, as if `uri` had set it.
    pub fn insert(&self, uri: &Url, cookie: Cookie) {
        let Some(origin) = origin_key(uri) else { return };
        let mut entry = self.inner.entry(origin).or_default();
        upsert(entry.value_mut(), cookie);
    }

    /// Number of origins holding at least one cookie.
    pub fn origin_count(&self) -> usize {
        self.inner.iter().filter(|e| !e.value().is_empty()).count()
    }

    /// Forget every cookie.
    pub fn clear(&self) {
        self.inner.clear();
    }
}

impl CookieJar for LocalCookieJar {
    fn merge_from(&self, uri: &Url, set_cookies: &[String]) {
        let Some(origin) = origin_key(uri) else {
            tracing::debug!(uri = %uri, "opaque origin; cookies not stored");
            return;
        };
        let mut entry = self.inner.entry(origin).or_default();
        let cookies = entry.value_mut();
        for raw in set_cookies {
            match SetCookie::parse(raw) {
                Some(SetCookie::Store(cookie)) => upsert(cookies, cookie),
                Some(SetCookie::Expire(name)) => cookies.retain(|c| c.name != name),
                None => tracing::debug!(header = %raw, "ignoring malformed Set-Cookie"),
            }
        }
    }

    fn cookies_for(&self, uri: &Url) -> Vec<Cookie> {
        origin_key(uri)
            .and_then(|origin| self.inner.get(&origin).map(|e| e.value().clone()))
            .unwrap_or_default()
    }
}

fn upsert(cookies: &mut Vec<Cookie>, cookie: Cookie) {
    match cookies.iter_mut().find(|c| c.name == cookie.name) {
        Some(existing) => existing.value = cookie.value,
        None => cookies.push(cookie),
    }
}
