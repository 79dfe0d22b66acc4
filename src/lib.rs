//! Declarative asynchronous HTTP requests.
//!
//! Describe a request through location-aware parameters, send it on a
//! shared [`TransportClient`], and branch on the returned [`Response`]:
//! sends never fail, errors ride on the response.

pub mod config;
pub mod cookies;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod observability;
pub mod params;
pub mod request;
pub mod response;
pub mod transport;

pub use config::ClientConfig;
pub use cookies::{CookieJar, CookieMode, LocalCookieJar};
pub use error::{RequestError, SendError};
pub use lifecycle::{CancelSource, CancelToken, Tracking, TrackingEvent};
pub use params::ParamLocation;
pub use request::{Method, Request};
pub use response::Response;
pub use transport::{HyperEngine, ReqwestEngine, RequestSnapshot, TransportClient};
