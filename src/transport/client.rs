//! The send pipeline.

use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use http::header::SET_COOKIE;
use http::Version;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use super::encoding::decode_header_value;
use super::engine::{Engine, EngineTimeout, ResolvedUri};
use super::reqwest_engine::ReqwestEngine;
use super::snapshot::RequestSnapshot;
use crate::config::{ClientConfig, ConfigError, RequestDefaults};
use crate::error::{EngineError, RequestError, SendError};
use crate::format::{BodyFormatter, FormatterRegistry};
use crate::lifecycle::tracking::{notify_end, notify_error, notify_initialize, notify_sending};
use crate::lifecycle::{CancelReason, CancelToken, LinkedCancel, PhaseTimer};
use crate::request::Request;
use crate::response::Response;

static GLOBAL: OnceLock<TransportClient> = OnceLock::new();

/// Executes sends over a shared engine.
///
/// One client is meant to be built once and shared; every `send` is an
/// independent future and any number may run concurrently.
#[derive(Debug)]
pub struct TransportClient<E = ReqwestEngine> {
    engine: E,
    formatters: FormatterRegistry,
    defaults: RequestDefaults,
}

impl TransportClient<ReqwestEngine> {
    /// Build a client with the default engine from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let engine =
            ReqwestEngine::new(&config.transport).map_err(|e| ConfigError::Engine(e.to_string()))?;
        Ok(Self::with_engine(engine, config.request.clone()))
    }

    /// The process-wide client with default configuration.
    pub fn global() -> Result<&'static Self, ConfigError> {
        if let Some(client) = GLOBAL.get() {
            return Ok(client);
        }
        let client = Self::new(&ClientConfig::default())?;
        Ok(GLOBAL.get_or_init(move || client))
    }
}

impl<E: Engine> TransportClient<E> {
    pub fn with_engine(engine: E, defaults: RequestDefaults) -> Self {
        Self {
            engine,
            formatters: FormatterRegistry::default(),
            defaults,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }

    /// Register (or replace) the body formatter for a content type.
    pub fn register_formatter(&mut self, content_type: &str, formatter: Arc<dyn BodyFormatter>) {
        self.formatters.register(content_type, formatter);
    }

    /// A new request with this client's timeout and cookie defaults applied.
    pub fn request(&self, base_url: &str) -> Result<Request, RequestError> {
        let mut request = Request::new(base_url)?;
        request.set_timeout(self.defaults.timeout());
        request.set_cookie_mode(self.defaults.cookies);
        Ok(request)
    }

    /// Send `request` and store the response on it.
    ///
    /// Never fails: transport errors, timeouts and cancellation are carried
    /// by the returned response. The request's own timeout and `cancel` are
    /// linked; whichever fires first aborts the exchange.
    pub async fn send(&self, request: &mut Request, cancel: &CancelToken) -> Response {
        let span = tracing::debug_span!(
            "send",
            send_id = %Uuid::new_v4(),
            method = %request.http_method(),
            url = %request,
        );
        self.run(request, cancel).instrument(span).await
    }

    async fn run(&self, request: &mut Request, cancel: &CancelToken) -> Response {
        let mut timer = PhaseTimer::start();
        notify_initialize(request);
        let trackings = request.trackings().to_vec();

        let snapshot = RequestSnapshot::capture(
            request,
            &self.formatters,
            self.defaults.user_agent.as_deref(),
        )
        .map(Arc::new);

        let outcome = match &snapshot {
            Ok(snapshot) => {
                timer.readied();
                notify_sending(&trackings, snapshot);
                self.exchange(request, snapshot, cancel, &mut timer).await
            }
            Err(err) => Err(err.clone()),
        };

        let mut response = match outcome {
            Ok(response) => {
                timer.ended();
                notify_end(&trackings, &response);
                response
            }
            Err(err) => {
                timer.errored();
                tracing::warn!(error = %err, "send failed");
                let response = Response::failed(err);
                notify_error(&trackings, &response);
                response
            }
        };

        timer.ending();
        tracing::debug!(status = response.status_code(), phases = %timer, "send finished");

        if let Ok(snapshot) = snapshot {
            response.attach_snapshot(snapshot);
        }
        request.set_response(response.clone());
        response
    }

    async fn exchange(
        &self,
        request: &Request,
        snapshot: &RequestSnapshot,
        cancel: &CancelToken,
        timer: &mut PhaseTimer,
    ) -> Result<Response, SendError> {
        let message = snapshot.to_message()?;
        let linked = LinkedCancel::new(request.timeout(), cancel);

        let result = tokio::select! {
            biased;
            reason = linked.fired() => {
                tracing::debug!(reason = %reason, "send cancelled");
                return Err(SendError::Timeout(reason));
            }
            result = self.engine.execute(message) => result,
        };
        timer.sent();

        let message = result.map_err(classify)?.ok_or(SendError::NoResponse)?;
        Ok(normalize(request, snapshot, message))
    }
}

fn classify(err: EngineError) -> SendError {
    if err.is::<EngineTimeout>() {
        SendError::Timeout(CancelReason::Engine)
    } else {
        SendError::transport(err)
    }
}

/// Turn the engine's message into a [`Response`], merging cookies on the way.
fn normalize(
    request: &Request,
    snapshot: &RequestSnapshot,
    message: http::Response<Bytes>,
) -> Response {
    let (parts, body) = message.into_parts();
    let resolved = parts
        .extensions
        .get::<ResolvedUri>()
        .map(|uri| uri.0.clone())
        .unwrap_or_else(|| snapshot.url().clone());

    let status_text = parts
        .extensions
        .get::<hyper::ext::ReasonPhrase>()
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
        .or_else(|| parts.status.canonical_reason().map(str::to_string))
        .unwrap_or_default();

    let headers: Vec<(String, String)> = parts
        .headers
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), decode_header_value(value)))
        .collect();

    let mut response = Response::received(
        parts.status.as_u16(),
        status_text,
        render_version(&resolved, parts.version),
        headers,
        body,
    );

    if request.cookie_mode().is_enabled() {
        let jar = request.cookie_jar();
        let set_cookies: Vec<String> = parts
            .headers
            .get_all(SET_COOKIE)
            .iter()
            .map(decode_header_value)
            .collect();
        if !set_cookies.is_empty() {
            jar.merge_from(&resolved, &set_cookies);
        }
        response.set_cookies(jar.cookies_for(&resolved));
    }
    response
}

fn render_version(uri: &Url, version: Version) -> String {
    let number = match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    };
    format!("{}/{}", uri.scheme().to_ascii_uppercase(), number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::{CookieJar, LocalCookieJar};
    use crate::lifecycle::{CancelSource, TrackingEvent, TrackingKind};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Engine answering from a closure, optionally after a delay.
    struct MockEngine<F> {
        delay: Duration,
        reply: F,
    }

    impl<F> Engine for MockEngine<F>
    where
        F: Fn(&http::Request<Bytes>) -> Result<Option<http::Response<Bytes>>, EngineError>
            + Send
            + Sync,
    {
        async fn execute(
            &self,
            request: http::Request<Bytes>,
        ) -> Result<Option<http::Response<Bytes>>, EngineError> {
            tokio::time::sleep(self.delay).await;
            (self.reply)(&request)
        }
    }

    fn mock_client<F>(delay: Duration, reply: F) -> TransportClient<MockEngine<F>>
    where
        F: Fn(&http::Request<Bytes>) -> Result<Option<http::Response<Bytes>>, EngineError>
            + Send
            + Sync,
    {
        TransportClient::with_engine(MockEngine { delay, reply }, RequestDefaults::default())
    }

    fn ok_with_test_header(_: &http::Request<Bytes>) -> Result<Option<http::Response<Bytes>>, EngineError> {
        let response = http::Response::builder()
            .status(200)
            .header("X-Test", "1")
            .body(Bytes::from_static(b"hello"))?;
        Ok(Some(response))
    }

    #[tokio::test]
    async fn successful_send_is_normalized() {
        let client = mock_client(Duration::ZERO, ok_with_test_header);
        let mut request = Request::new("http://example.com").unwrap().with_path("/items");

        let response = client.send(&mut request, &CancelToken::none()).await;

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.status_text(), "OK");
        assert_eq!(response.version(), "HTTP/1.1");
        assert!(response.is_success());
        assert!(response.error().is_none());
        assert_eq!(response.header("x-test"), Some("1"));
        assert_eq!(response.text(), "hello");
        assert_eq!(
            response.snapshot().unwrap().url().as_str(),
            "http://example.com/items"
        );
        assert_eq!(request.response().unwrap().status_code(), 200);
    }

    #[tokio::test]
    async fn slow_engine_times_out() {
        let client = mock_client(Duration::from_secs(5), ok_with_test_header);
        let mut request = Request::new("http://example.com")
            .unwrap()
            .with_timeout(Duration::from_millis(50));

        let response = client.send(&mut request, &CancelToken::none()).await;

        assert!(response.error().unwrap().is_timeout());
        assert_eq!(response.status_code(), 0);
        assert!(!response.is_success());
        assert!(request.error().is_some());
    }

    #[tokio::test]
    async fn caller_cancel_wins_over_long_timeout() {
        let client = mock_client(Duration::from_secs(5), ok_with_test_header);
        let mut request = Request::new("http://example.com").unwrap();
        let source = CancelSource::new();
        source.cancel();

        let response = client.send(&mut request, &source.token()).await;
        assert!(matches!(
            response.error(),
            Some(SendError::Timeout(CancelReason::Caller))
        ));
    }

    #[tokio::test]
    async fn engine_failures_are_classified() {
        let client = mock_client(Duration::ZERO, |_: &http::Request<Bytes>| Ok(None));
        let mut request = Request::new("http://example.com").unwrap();
        let response = client.send(&mut request, &CancelToken::none()).await;
        assert!(matches!(response.error(), Some(SendError::NoResponse)));

        let client = client_err();
        let response = client.send(&mut request, &CancelToken::none()).await;
        assert!(matches!(response.error(), Some(SendError::Transport(_))));
        assert_eq!(response.error().unwrap().to_string(), "transport error: connection refused");

        let client = mock_client(Duration::ZERO, |_: &http::Request<Bytes>| {
            Err(Box::new(EngineTimeout) as EngineError)
        });
        let response = client.send(&mut request, &CancelToken::none()).await;
        assert!(matches!(
            response.error(),
            Some(SendError::Timeout(CancelReason::Engine))
        ));
    }

    fn client_err() -> TransportClient<
        MockEngine<impl Fn(&http::Request<Bytes>) -> Result<Option<http::Response<Bytes>>, EngineError> + Send + Sync>,
    > {
        mock_client(Duration::ZERO, |_: &http::Request<Bytes>| {
            Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )) as EngineError)
        })
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_engine() {
        let client = mock_client(Duration::ZERO, |_: &http::Request<Bytes>| {
            panic!("engine must not be called")
        });
        let mut request = Request::default().with_path("/relative");
        let response = client.send(&mut request, &CancelToken::none()).await;
        assert!(matches!(response.error(), Some(SendError::InvalidRequest(_))));
        assert!(response.snapshot().is_none());
    }

    #[tokio::test]
    async fn trackings_fire_in_lifecycle_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let client = mock_client(Duration::ZERO, ok_with_test_header);
        let mut request = Request::new("http://example.com").unwrap();
        let log = seen.clone();
        request.add_tracking(move |event: TrackingEvent<'_>| {
            log.lock().unwrap().push(event.kind());
        });

        client.send(&mut request, &CancelToken::none()).await;
        assert_eq!(
            *seen.lock().unwrap(),
            vec![TrackingKind::Initialize, TrackingKind::Sending, TrackingKind::End]
        );

        seen.lock().unwrap().clear();
        let failing = client_err();
        failing.send(&mut request, &CancelToken::none()).await;
        assert_eq!(
            *seen.lock().unwrap(),
            vec![TrackingKind::Initialize, TrackingKind::Sending, TrackingKind::Error]
        );
    }

    #[tokio::test]
    async fn set_cookie_is_merged_into_request_jar() {
        let client = mock_client(Duration::ZERO, |_: &http::Request<Bytes>| {
            let response = http::Response::builder()
                .status(200)
                .header("Set-Cookie", "a=1; Path=/")
                .header("Set-Cookie", "b=2")
                .body(Bytes::new())?;
            Ok(Some(response))
        });
        let jar = Arc::new(LocalCookieJar::new());
        let mut request = Request::new("http://cookies.test").unwrap();
        request.set_cookie_jar(jar.clone());

        let response = client.send(&mut request, &CancelToken::none()).await;

        let names: Vec<_> = response.cookies().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        let url = Url::parse("http://cookies.test/").unwrap();
        assert_eq!(jar.header_for(&url).as_deref(), Some("a=1; b=2"));
    }

    #[test]
    fn versions_render_with_scheme() {
        let https = Url::parse("https://example.com").unwrap();
        assert_eq!(render_version(&https, Version::HTTP_2), "HTTPS/2");
        let http = Url::parse("http://example.com").unwrap();
        assert_eq!(render_version(&http, Version::HTTP_10), "HTTP/1.0");
    }
}
