//! The network engine seam.

use std::fmt;
use std::future::Future;

use bytes::Bytes;
use url::Url;

use crate::error::EngineError;

/// Performs one network exchange.
///
/// The engine owns connection pooling, redirects, decompression and TLS.
/// It must return a fully buffered response, or `Ok(None)` when the
/// exchange finished without one.
pub trait Engine: Send + Sync {
    fn execute(
        &self,
        request: http::Request<Bytes>,
    ) -> impl Future<Output = Result<Option<http::Response<Bytes>>, EngineError>> + Send;
}

/// Response extension: the URI the final response was served from, after
/// redirects. Cookies are merged against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUri(pub Url);

/// An engine gave up on its own deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineTimeout;

impl fmt::Display for EngineTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("engine timeout ceiling exceeded")
    }
}

impl std::error::Error for EngineTimeout {}
