//! Lifecycle of a single send.
//!
//! # Data Flow
//! ```text
//! send() starts
//!     → timer.rs (PhaseTimer stamps Created)
//!     → tracking.rs (Initialize hooks)
//!     → snapshot built, timer Readied, Sending hooks
//!     → cancel.rs (LinkedCancel: request timeout + caller token)
//!     → engine call, timer Sent
//!     → End or Error hooks, timer Ended/Errored → Ending
//! ```
//!
//! # Design Decisions
//! - One timer per send; never shared
//! - Cancellation is level-triggered and one-way
//! - Tracking panics are caught and logged, never propagated

pub mod cancel;
pub mod timer;
pub mod tracking;

pub use cancel::{CancelReason, CancelSource, CancelToken, LinkedCancel};
pub use timer::{Phase, PhaseTimer};
pub use tracking::{SharedTracking, Tracking, TrackingEvent, TrackingKind};
