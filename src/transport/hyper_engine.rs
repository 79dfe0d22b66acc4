//! Plain-HTTP engine on hyper-util's pooled legacy client.
//!
//! Does not follow redirects or decode compressed bodies.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use super::engine::{Engine, EngineTimeout, ResolvedUri};
use crate::config::TransportConfig;
use crate::error::EngineError;

#[derive(Clone)]
pub struct HyperEngine {
    client: Client<HttpConnector, Full<Bytes>>,
    ceiling: Duration,
}

impl HyperEngine {
    pub fn new(config: &TransportConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build(connector);

        Self {
            client,
            ceiling: Duration::from_secs(config.timeout_ceiling_secs),
        }
    }

    async fn exchange(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<Option<http::Response<Bytes>>, EngineError> {
        let resolved = Url::parse(&request.uri().to_string()).ok();
        let response = self.client.request(request.map(Full::new)).await?;

        let (mut parts, body) = response.into_parts();
        let body = body.collect().await?.to_bytes();
        if let Some(resolved) = resolved {
            parts.extensions.insert(ResolvedUri(resolved));
        }
        Ok(Some(http::Response::from_parts(parts, body)))
    }
}

impl Engine for HyperEngine {
    async fn execute(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<Option<http::Response<Bytes>>, EngineError> {
        match tokio::time::timeout(self.ceiling, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(Box::new(EngineTimeout)),
        }
    }
}

impl std::fmt::Debug for HyperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperEngine")
            .field("ceiling", &self.ceiling)
            .finish_non_exhaustive()
    }
}
