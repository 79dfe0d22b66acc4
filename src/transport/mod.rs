//! Request transmission.
//!
//! # Data Flow
//! ```text
//! TransportClient::send(&mut Request, &CancelToken)
//!     → Initialize hooks
//!     → snapshot.rs (URL, headers, Cookie from jar, body via formatter)
//!     → Sending hooks
//!     → encoding.rs (Latin-1 transfer of header values)
//!     → engine.rs (ReqwestEngine | HyperEngine) under LinkedCancel
//!     → normalize (status, flattened headers, Set-Cookie → jar)
//!     → End | Error hooks
//!     → Response stored on the request
//! ```
//!
//! # Responsibilities
//! - Run one send end to end without ever returning `Err`
//! - Classify failures (timeout, transport, no response, invalid request)
//! - Merge cookies against the URI the response was actually served from
//!
//! # Design Decisions
//! - The engine is the only suspension point of a send
//! - Redirects, decompression and pooling belong to the engine
//! - One client is shared by many concurrent sends; it holds no per-send state

pub mod client;
pub mod convenience;
pub mod encoding;
pub mod engine;
pub mod hyper_engine;
pub mod reqwest_engine;
pub mod snapshot;

pub use client::TransportClient;
pub use engine::{Engine, EngineTimeout, ResolvedUri};
pub use hyper_engine::HyperEngine;
pub use reqwest_engine::ReqwestEngine;
pub use snapshot::RequestSnapshot;
