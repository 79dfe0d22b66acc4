//! The request aggregate.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::Version;
use serde_json::Value;
use url::Url;

use super::body::{Body, BodyMut, BodyState, CONTENT_TYPE};
use super::method::Method;
use super::resolve::{normalize_base_url, resolve_url};
use crate::cookies::{local_cookies, CookieJar, CookieMode, SharedCookieJar};
use crate::error::{RequestError, SendError};
use crate::format::content_type;
use crate::lifecycle::{SharedTracking, Tracking};
use crate::params::{ParamLocation, ParamRef, ParamStore, ParamView, ParamViewMut};
use crate::response::Response;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// A declaratively described HTTP request.
///
/// Everything addressable by name (headers, query, path placeholders, body
/// fields) lives in one [`ParamStore`]; the typed accessors are views over it.
/// The method is stored as a tag, and the verb text is derived from it, so
/// the two can never disagree.
#[derive(Clone)]
pub struct Request {
    params: ParamStore,
    body: BodyState,
    method: Method,
    custom_verb: Option<String>,
    base_url: Option<Url>,
    path: Option<String>,
    timeout: Duration,
    version: Version,
    cookie_mode: CookieMode,
    cookie_jar: Option<SharedCookieJar>,
    response: Option<Response>,
    trackings: Vec<SharedTracking>,
}

impl Request {
    /// A request against `base_url`. A missing scheme defaults to `http://`.
    pub fn new(base_url: &str) -> Result<Self, RequestError> {
        let mut request = Self::default();
        request.base_url = Some(normalize_base_url(base_url)?);
        Ok(request)
    }

    // --- Method ---

    pub fn method(&self) -> Method {
        self.method
    }

    /// Set the method tag. `Custom` has no verb of its own and becomes `Get`.
    pub fn set_method(&mut self, method: Method) {
        self.method = match method {
            Method::Custom => Method::Get,
            other => other,
        };
        self.custom_verb = None;
        self.on_method_changed();
    }

    /// The verb text sent on the wire, always uppercase.
    pub fn http_method(&self) -> &str {
        match (self.method, &self.custom_verb) {
            (Method::Custom, Some(verb)) => verb.as_str(),
            (method, _) => method.canonical(),
        }
    }

    /// Set the verb text. Known verbs map to their tag; anything else is
    /// kept (uppercased) under `Method::Custom`.
    pub fn set_http_method(&mut self, verb: &str) {
        let verb = verb.trim().to_ascii_uppercase();
        self.method = Method::from_verb(&verb);
        self.custom_verb = (self.method == Method::Custom).then_some(verb);
        self.on_method_changed();
    }

    fn on_method_changed(&mut self) {
        if self.method == Method::Post && !self.params.contains(ParamLocation::Header, CONTENT_TYPE) {
            self.params
                .set(ParamLocation::Header, CONTENT_TYPE, content_type::FORM);
        }
    }

    // --- URL ---

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn set_base_url(&mut self, base_url: &str) -> Result<(), RequestError> {
        self.base_url = Some(normalize_base_url(base_url)?);
        Ok(())
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Relative path joined onto the base URL. May contain `{name}` placeholders.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    /// Base URL + path, placeholders filled, query appended.
    pub fn full_url(&self) -> Result<Url, RequestError> {
        resolve_url(
            self.base_url.as_ref(),
            self.path.as_deref(),
            self.path_params(),
            self.query(),
        )
    }

    // --- Transmission settings ---

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    pub fn cookie_mode(&self) -> CookieMode {
        self.cookie_mode
    }

    pub fn set_cookie_mode(&mut self, mode: CookieMode) {
        self.cookie_mode = mode;
    }

    /// The jar this request reads and merges: its own, or the process-wide one.
    pub fn cookie_jar(&self) -> SharedCookieJar {
        self.cookie_jar.clone().unwrap_or_else(local_cookies)
    }

    /// Use a private jar instead of the process-wide one.
    pub fn set_cookie_jar(&mut self, jar: Arc<dyn CookieJar>) {
        self.cookie_jar = Some(jar);
    }

    /// Go back to the process-wide jar.
    pub fn use_local_cookies(&mut self) {
        self.cookie_jar = None;
    }

    // --- Parameter views ---

    pub fn headers(&self) -> ParamView<'_> {
        ParamView::new(&self.params, ParamLocation::Header)
    }

    pub fn headers_mut(&mut self) -> ParamViewMut<'_> {
        ParamViewMut::new(&mut self.params, ParamLocation::Header)
    }

    pub fn query(&self) -> ParamView<'_> {
        ParamView::new(&self.params, ParamLocation::Query)
    }

    pub fn query_mut(&mut self) -> ParamViewMut<'_> {
        ParamViewMut::new(&mut self.params, ParamLocation::Query)
    }

    pub fn path_params(&self) -> ParamView<'_> {
        ParamView::new(&self.params, ParamLocation::Path)
    }

    pub fn path_params_mut(&mut self) -> ParamViewMut<'_> {
        ParamViewMut::new(&mut self.params, ParamLocation::Path)
    }

    pub fn body(&self) -> Body<'_> {
        Body::new(&self.params, &self.body)
    }

    pub fn body_mut(&mut self) -> BodyMut<'_> {
        BodyMut::new(&mut self.params, &mut self.body)
    }

    /// Every parameter across all locations.
    pub fn params(&self) -> impl Iterator<Item = ParamRef<'_>> + Clone + '_ {
        self.params.iter()
    }

    /// Where a loose parameter named `name` would be placed right now.
    pub fn param_location(&self, name: &str) -> ParamLocation {
        let placeholder = format!("{{{name}}}");
        if self.path.as_deref().is_some_and(|p| p.contains(&placeholder)) {
            ParamLocation::Path
        } else if self.method.carries_body() {
            ParamLocation::Body
        } else {
            ParamLocation::Query
        }
    }

    /// Set a parameter, choosing its location from the path and method.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ParamLocation {
        let name = name.into();
        let location = self.param_location(&name);
        self.params.set(location, name, value);
        location
    }

    /// Look a name up across locations: path, query, body, then headers.
    pub fn param(&self, name: &str) -> Option<&Value> {
        [
            ParamLocation::Path,
            ParamLocation::Query,
            ParamLocation::Body,
            ParamLocation::Header,
        ]
        .into_iter()
        .find_map(|location| self.params.get(location, name))
    }

    pub(crate) fn store(&self) -> &ParamStore {
        &self.params
    }

    // --- Lifecycle ---

    /// Register a tracking; trackings fire in registration order.
    pub fn add_tracking(&mut self, tracking: impl Tracking + 'static) -> &mut Self {
        self.trackings.push(Arc::new(tracking));
        self
    }

    pub fn add_shared_tracking(&mut self, tracking: SharedTracking) -> &mut Self {
        self.trackings.push(tracking);
        self
    }

    pub fn trackings(&self) -> &[SharedTracking] {
        &self.trackings
    }

    /// Latest response, stored by the last send.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Error of the latest send, if it failed.
    pub fn error(&self) -> Option<&SendError> {
        self.response.as_ref().and_then(Response::error)
    }

    pub(crate) fn set_response(&mut self, response: Response) {
        if response.error().is_none() && !response.is_success() {
            tracing::info!(
                status = response.status_code(),
                url = %self,
                "request completed with non-success status"
            );
        }
        self.response = Some(response);
    }

    // --- Builder-style helpers ---

    pub fn with_method(mut self, method: Method) -> Self {
        self.set_method(method);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.set_path(path);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.set_timeout(timeout);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers_mut().set(name, value);
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query_mut().set(name, value);
        self
    }
}

impl Default for Request {
    fn default() -> Self {
        Self {
            params: ParamStore::new(),
            body: BodyState::default(),
            method: Method::Get,
            custom_verb: None,
            base_url: None,
            path: None,
            timeout: DEFAULT_TIMEOUT,
            version: Version::HTTP_11,
            cookie_mode: CookieMode::default(),
            cookie_jar: None,
            response: None,
            trackings: Vec::new(),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.base_url, self.full_url()) {
            (Some(_), Ok(url)) => f.write_str(url.as_str()),
            _ => f.write_str("http://"),
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.http_method())
            .field("url", &self.to_string())
            .field("params", &self.params)
            .field("timeout", &self.timeout)
            .field("version", &self.version)
            .field("cookie_mode", &self.cookie_mode)
            .field("private_jar", &self.cookie_jar.is_some())
            .field("trackings", &self.trackings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALL: [Method; 9] = [
        Method::Get,
        Method::Post,
        Method::Head,
        Method::Trace,
        Method::Put,
        Method::Delete,
        Method::Options,
        Method::Connect,
        Method::Custom,
    ];

    #[test]
    fn method_text_follows_tag_and_back() {
        for method in ALL {
            let mut request = Request::default();
            request.set_method(method);
            assert_eq!(request.http_method(), method.canonical());

            let mut rederived = Request::default();
            rederived.set_http_method(request.http_method());
            let expected = if method == Method::Custom { Method::Get } else { method };
            assert_eq!(rederived.method(), expected);
        }
    }

    #[test]
    fn custom_verb_is_kept_uppercase() {
        let mut request = Request::default();
        request.set_http_method("purge");
        assert_eq!(request.method(), Method::Custom);
        assert_eq!(request.http_method(), "PURGE");

        request.set_method(Method::Custom);
        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.http_method(), "GET");
    }

    #[test]
    fn known_verb_text_sets_tag() {
        let mut request = Request::default();
        request.set_http_method("put");
        assert_eq!(request.method(), Method::Put);
        assert_eq!(request.http_method(), "PUT");
    }

    #[test]
    fn post_defaults_to_form_content_type() {
        let mut request = Request::default();
        request.set_method(Method::Post);
        assert_eq!(request.body().content_type().as_deref(), Some(content_type::FORM));

        let mut by_text = Request::default();
        by_text.set_http_method("post");
        assert_eq!(by_text.body().content_type().as_deref(), Some(content_type::FORM));
    }

    #[test]
    fn post_keeps_explicit_content_type() {
        let mut request = Request::default();
        request.headers_mut().set("content-type", content_type::JSON);
        request.set_method(Method::Post);
        assert_eq!(request.body().content_type().as_deref(), Some(content_type::JSON));
        assert_eq!(request.headers().len(), 1);
    }

    #[test]
    fn full_url_joins_base_and_path() {
        let request = Request::new("http://example.com").unwrap().with_path("/items");
        assert_eq!(request.full_url().unwrap().as_str(), "http://example.com/items");
        assert_eq!(request.to_string(), "http://example.com/items");
    }

    #[test]
    fn display_without_base_is_placeholder() {
        let request = Request::default().with_path("/items");
        assert_eq!(request.to_string(), "http://");
    }

    #[test]
    fn set_param_places_by_path_and_method() {
        let mut request = Request::new("http://example.com")
            .unwrap()
            .with_path("/users/{id}");
        assert_eq!(request.set_param("id", 7), ParamLocation::Path);
        assert_eq!(request.set_param("page", 1), ParamLocation::Query);

        request.set_method(Method::Post);
        assert_eq!(request.set_param("name", "bob"), ParamLocation::Body);

        assert_eq!(request.param("id"), Some(&json!(7)));
        assert_eq!(request.full_url().unwrap().as_str(), "http://example.com/users/7?page=1");
        assert_eq!(request.body().fields().get("name"), Some(&json!("bob")));
    }

    #[test]
    fn views_share_one_store() {
        let mut request = Request::default();
        request.headers_mut().set("X-A", "1");
        request.query_mut().set("q", "rust");
        request.body_mut().set("field", 1);

        let all: Vec<_> = request.params().map(|p| (p.location, p.name)).collect();
        assert_eq!(
            all,
            vec![
                (ParamLocation::Header, "X-A"),
                (ParamLocation::Query, "q"),
                (ParamLocation::Body, "field"),
            ]
        );
    }

    #[test]
    fn defaults_match_documented_values() {
        let request = Request::default();
        assert_eq!(request.timeout(), Duration::from_secs(15));
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.cookie_mode(), CookieMode::Enabled);
        assert!(request.response().is_none());
    }
}
