//! Configuration schema definitions.
//!
//! Every section is optional in the file; missing fields take the defaults
//! below.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cookies::CookieMode;

/// Root configuration for a transport client.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Engine settings (redirects, pooling, ceilings).
    pub transport: TransportConfig,

    /// Defaults applied to requests created through the client.
    pub request: RequestDefaults,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Engine settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Follow redirects automatically.
    pub auto_redirect: bool,

    /// Maximum redirects followed per send.
    pub max_redirects: u32,

    /// Transparently decode gzip bodies.
    pub decompress: bool,

    /// Hard upper bound on any single exchange, in seconds.
    pub timeout_ceiling_secs: u64,

    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Idle pooled connections kept per host.
    pub pool_max_idle_per_host: usize,

    /// Honour `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub system_proxy: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            auto_redirect: true,
            max_redirects: 10,
            decompress: true,
            timeout_ceiling_secs: 30,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 32,
            system_proxy: true,
        }
    }
}

/// Per-request defaults.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RequestDefaults {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,

    /// Cookie handling for new requests.
    pub cookies: CookieMode,

    /// `User-Agent` sent when a request declares none.
    pub user_agent: Option<String>,
}

impl RequestDefaults {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            cookies: CookieMode::Enabled,
            user_agent: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
