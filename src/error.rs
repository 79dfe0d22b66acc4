//! Error definitions shared across the request pipeline.
//!
//! # Design Decisions
//! - `send` never returns `Err`; a `SendError` travels inside the response
//! - Engine errors are kept behind an `Arc` so responses stay cheap to clone
//! - Caller cancellation and timeouts collapse into one user-facing kind

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::lifecycle::CancelReason;

/// Boxed error produced by a transport engine.
pub type EngineError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while describing a request (before anything is sent).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// Base URL could not be parsed even after scheme normalisation.
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Relative path could not be joined onto the base URL.
    #[error("cannot resolve path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Neither a base URL nor an absolute path was provided.
    #[error("request has no base url")]
    MissingBaseUrl,

    /// Method text is not a valid HTTP token.
    #[error("invalid http method '{0}'")]
    InvalidMethod(String),
}

/// Errors raised by body formatters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    /// No formatter is registered for the content type.
    #[error("no body formatter registered for '{0}'")]
    Unsupported(String),

    /// The formatter rejected the body fields.
    #[error("body serialization failed: {0}")]
    Serialize(String),
}

/// Why a send did not produce a well-formed response.
#[derive(Debug, Clone, Error)]
pub enum SendError {
    /// The per-request timeout or the caller's cancel token fired first.
    #[error("request timed out")]
    Timeout(CancelReason),

    /// The engine failed (connect, TLS, protocol, body read).
    #[error("transport error: {0}")]
    Transport(#[source] SharedEngineError),

    /// The engine completed without yielding a response.
    #[error("no response received")]
    NoResponse,

    /// The request could not be turned into a transport message.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl SendError {
    /// Wrap an engine error unchanged.
    pub fn transport(err: EngineError) -> Self {
        SendError::Transport(SharedEngineError(Arc::from(err)))
    }

    /// True for both timeout and caller cancellation.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SendError::Timeout(_))
    }
}

impl From<RequestError> for SendError {
    fn from(err: RequestError) -> Self {
        SendError::InvalidRequest(err.to_string())
    }
}

impl From<FormatError> for SendError {
    fn from(err: FormatError) -> Self {
        SendError::InvalidRequest(err.to_string())
    }
}

/// Cloneable handle to the engine error that failed a send.
#[derive(Clone)]
pub struct SharedEngineError(pub Arc<dyn std::error::Error + Send + Sync + 'static>);

impl SharedEngineError {
    /// The original engine error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

impl fmt::Debug for SharedEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for SharedEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for SharedEngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}
