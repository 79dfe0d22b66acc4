//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! TransportClient::send
//!     → "send" span (send_id, method, url)
//!     → debug! per phase, warn! on failure, info! on non-success status
//!     → logging.rs subscriber (EnvFilter + fmt)
//! ```
//!
//! # Design Decisions
//! - Library code only emits events; installing a subscriber is the binary's call
//! - Logging never affects control flow

pub mod logging;

pub use logging::init_logging;
