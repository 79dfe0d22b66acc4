//! Declarative request description.
//!
//! # Data Flow
//! ```text
//! caller
//!     → aggregate.rs (Request: method tag, base URL, path, settings)
//!     → params views (headers / query / path / body over one ParamStore)
//!     → resolve.rs (base + path + placeholders + query → Url)
//!     → transport::snapshot (frozen copy taken at send time)
//! ```
//!
//! # Responsibilities
//! - Keep the method tag and verb text consistent
//! - Route loose parameters to the right location
//! - Resolve the full URL on demand
//!
//! # Design Decisions
//! - The verb text is derived, never stored, except for custom verbs
//! - Body content type and the `Content-Type` header are the same parameter
//! - Nothing here touches the network

pub mod body;
pub mod aggregate;
pub mod method;
pub mod resolve;

pub use aggregate::{Request, DEFAULT_TIMEOUT};
pub use body::{Body, BodyMut};
pub use method::Method;
pub use resolve::normalize_base_url;
