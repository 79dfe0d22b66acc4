//! Default engine backed by `reqwest`.

use std::time::Duration;

use bytes::Bytes;
use reqwest::redirect::Policy;

use super::engine::{Engine, EngineTimeout, ResolvedUri};
use crate::config::TransportConfig;
use crate::error::EngineError;

/// Pooled `reqwest` client configured from [`TransportConfig`].
///
/// Redirects and gzip decoding are handled here; cookies are not, the
/// pipeline manages them through its own jar.
#[derive(Debug, Clone)]
pub struct ReqwestEngine {
    client: reqwest::Client,
}

impl ReqwestEngine {
    pub fn new(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        let redirect = if config.auto_redirect {
            Policy::limited(config.max_redirects as usize)
        } else {
            Policy::none()
        };

        let mut builder = reqwest::Client::builder()
            .redirect(redirect)
            .gzip(config.decompress)
            .timeout(Duration::from_secs(config.timeout_ceiling_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host);
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        tracing::debug!(
            auto_redirect = config.auto_redirect,
            max_redirects = config.max_redirects,
            decompress = config.decompress,
            "reqwest engine ready"
        );
        Ok(Self { client })
    }

    /// Wrap an existing client as-is.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Engine for ReqwestEngine {
    async fn execute(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<Option<http::Response<Bytes>>, EngineError> {
        let request = reqwest::Request::try_from(request)?;
        let response = self.client.execute(request).await.map_err(classify)?;

        let resolved = response.url().clone();
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?;

        let mut message = http::Response::new(body);
        *message.status_mut() = status;
        *message.version_mut() = version;
        *message.headers_mut() = headers;
        message.extensions_mut().insert(ResolvedUri(resolved));
        Ok(Some(message))
    }
}

fn classify(err: reqwest::Error) -> EngineError {
    if err.is_timeout() {
        Box::new(EngineTimeout)
    } else {
        Box::new(err)
    }
}
