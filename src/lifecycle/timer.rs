//! Per-send phase timing.
//!
//! # States
//! ```text
//! Created → Readied → Sent → Ended ─┐
//!    │         │        │           ├→ Ending
//!    └─────────┴────────┴→ Errored ─┘
//! ```
//! Transitions only move forward and each stamps the clock once.

use std::fmt;
use std::time::{Duration, Instant};

/// Phase a send has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Created,
    Readied,
    Sent,
    Ended,
    Errored,
    Ending,
}

impl Phase {
    fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Created, Readied)
                | (Readied, Sent)
                | (Sent, Ended)
                | (Created | Readied | Sent, Errored)
                | (Ended | Errored, Ending)
        )
    }
}

/// Monotonic stamps for one send.
#[derive(Debug, Clone)]
pub struct PhaseTimer {
    phase: Phase,
    created: Instant,
    readied: Option<Instant>,
    sent: Option<Instant>,
    finished: Option<Instant>,
    ending: Option<Instant>,
    failed: bool,
}

impl PhaseTimer {
    /// Stamp the initialize phase.
    pub fn start() -> Self {
        Self {
            phase: Phase::Created,
            created: Instant::now(),
            readied: None,
            sent: None,
            finished: None,
            ending: None,
            failed: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Snapshot built; ready to transmit.
    pub fn readied(&mut self) -> bool {
        self.advance(Phase::Readied)
    }

    /// Response head received.
    pub fn sent(&mut self) -> bool {
        self.advance(Phase::Sent)
    }

    /// Response normalized.
    pub fn ended(&mut self) -> bool {
        self.advance(Phase::Ended)
    }

    /// Send failed.
    pub fn errored(&mut self) -> bool {
        self.advance(Phase::Errored)
    }

    /// Pipeline finished, success or not.
    pub fn ending(&mut self) -> bool {
        self.advance(Phase::Ending)
    }

    /// Time from creation to the latest stamp.
    pub fn total(&self) -> Duration {
        self.latest().duration_since(self.created)
    }

    fn latest(&self) -> Instant {
        self.ending
            .or(self.finished)
            .or(self.sent)
            .or(self.readied)
            .unwrap_or(self.created)
    }

    fn advance(&mut self, next: Phase) -> bool {
        if !self.phase.can_advance_to(next) {
            tracing::trace!(from = ?self.phase, to = ?next, "ignoring out-of-order phase");
            return false;
        }
        let now = Instant::now();
        match next {
            Phase::Readied => self.readied = Some(now),
            Phase::Sent => self.sent = Some(now),
            Phase::Ended => self.finished = Some(now),
            Phase::Errored => {
                self.finished = Some(now);
                self.failed = true;
            }
            Phase::Ending => self.ending = Some(now),
            Phase::Created => {}
        }
        self.phase = next;
        true
    }
}

impl fmt::Display for PhaseTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let finish_label = if self.failed { "error" } else { "end" };
        let stamps = [
            ("ready", self.readied),
            ("sent", self.sent),
            (finish_label, self.finished),
            ("ending", self.ending),
        ];

        let mut previous = self.created;
        let mut first = true;
        for (label, stamp) in stamps {
            let Some(stamp) = stamp else { continue };
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{label}={:?}", stamp.duration_since(previous))?;
            previous = stamp;
            first = false;
        }
        if !first {
            f.write_str(" ")?;
        }
        write!(f, "total={:?}", self.total())
    }
}
