//! Lifecycle observers ("trackings") attached to a request.
//!
//! # Responsibilities
//! - Define the closed set of events a send emits
//! - Dispatch each event to every registered tracking, in registration order
//! - Keep a misbehaving tracking from breaking the send

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;
use crate::transport::RequestSnapshot;

/// Event kinds, in the order a send emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingKind {
    Initialize,
    Sending,
    End,
    Error,
}

impl fmt::Display for TrackingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackingKind::Initialize => "initialize",
            TrackingKind::Sending => "sending",
            TrackingKind::End => "end",
            TrackingKind::Error => "error",
        };
        f.write_str(name)
    }
}

/// A lifecycle event with its payload.
///
/// `Initialize` hands out the request mutably so a tracking can still add
/// headers or parameters (signing, correlation ids) before the snapshot is
/// taken.
pub enum TrackingEvent<'a> {
    Initialize(&'a mut Request),
    Sending(&'a RequestSnapshot),
    End(&'a Response),
    Error(&'a Response),
}

impl TrackingEvent<'_> {
    pub fn kind(&self) -> TrackingKind {
        match self {
            TrackingEvent::Initialize(_) => TrackingKind::Initialize,
            TrackingEvent::Sending(_) => TrackingKind::Sending,
            TrackingEvent::End(_) => TrackingKind::End,
            TrackingEvent::Error(_) => TrackingKind::Error,
        }
    }
}

/// A hook fired at each lifecycle point of a send.
pub trait Tracking: Send + Sync {
    fn track(&self, event: TrackingEvent<'_>);
}

impl<F> Tracking for F
where
    F: Fn(TrackingEvent<'_>) + Send + Sync,
{
    fn track(&self, event: TrackingEvent<'_>) {
        self(event)
    }
}

/// Shared handle stored on a request.
pub type SharedTracking = Arc<dyn Tracking>;

/// Run the initialize hooks. Trackings may mutate the request.
pub(crate) fn notify_initialize(request: &mut Request) {
    let trackings = request.trackings().to_vec();
    for tracking in &trackings {
        isolate(TrackingKind::Initialize, || {
            tracking.track(TrackingEvent::Initialize(&mut *request))
        });
    }
}

/// Run the sending hooks.
pub(crate) fn notify_sending(trackings: &[SharedTracking], snapshot: &RequestSnapshot) {
    for tracking in trackings {
        isolate(TrackingKind::Sending, || tracking.track(TrackingEvent::Sending(snapshot)));
    }
}

/// Run the end hooks.
pub(crate) fn notify_end(trackings: &[SharedTracking], response: &Response) {
    for tracking in trackings {
        isolate(TrackingKind::End, || tracking.track(TrackingEvent::End(response)));
    }
}

/// Run the error hooks.
pub(crate) fn notify_error(trackings: &[SharedTracking], response: &Response) {
    for tracking in trackings {
        isolate(TrackingKind::Error, || tracking.track(TrackingEvent::Error(response)));
    }
}

fn isolate(kind: TrackingKind, hook: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(hook)).is_err() {
        tracing::warn!(event = %kind, "tracking panicked; continuing send");
    }
}
