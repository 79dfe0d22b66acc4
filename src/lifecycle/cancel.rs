//! Cancellation signals for in-flight sends.
//!
//! # Responsibilities
//! - Let callers abort a send from outside (`CancelSource` / `CancelToken`)
//! - Link the caller's token with the per-request timeout (`LinkedCancel`)
//!
//! # Design Decisions
//! - Level-triggered (`watch`), so a token observed after cancellation still fires
//! - Cancellation is one-way: once fired it never resets
//! - Both sources are plain futures dropped at scope exit; nothing to dispose

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Which source aborted a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The request's own timeout elapsed.
    Timeout(Duration),
    /// The caller's token fired.
    Caller,
    /// The engine gave up on its own deadline.
    Engine,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Timeout(after) => write!(f, "timeout after {after:?}"),
            CancelReason::Caller => write!(f, "cancelled by caller"),
            CancelReason::Engine => write!(f, "engine deadline exceeded"),
        }
    }
}

/// Owner side of a cancellation signal.
///
/// Cloning shares the same signal; any clone may trigger it.
#[derive(Debug, Clone)]
pub struct CancelSource {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelSource {
    /// Create a new, untriggered source.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Hand out a token observing this source.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: Some(self.tx.subscribe()),
            deadline: None,
        }
    }

    /// Trigger cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of live tokens still observing this source.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that never fires.
    pub fn none() -> Self {
        Self::default()
    }

    /// A token that fires once `after` has elapsed.
    ///
    /// A duration past the clock's range means no deadline.
    pub fn after(after: Duration) -> Self {
        Self {
            rx: None,
            deadline: Instant::now().checked_add(after),
        }
    }

    /// Add a deadline to this token, keeping the earlier of the two.
    pub fn with_deadline(mut self, after: Duration) -> Self {
        let Some(candidate) = Instant::now().checked_add(after) else {
            return self;
        };
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        });
        self
    }

    /// Whether the token has already fired.
    pub fn is_cancelled(&self) -> bool {
        let signalled = self.rx.as_ref().is_some_and(|rx| *rx.borrow());
        let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
        signalled || expired
    }

    /// Resolve once the token fires. Pends forever for `CancelToken::none()`.
    pub async fn cancelled(&self) {
        let signal = async {
            match &self.rx {
                Some(rx) => {
                    let mut rx = rx.clone();
                    let fired = rx.wait_for(|cancelled| *cancelled).await.is_ok();
                    if !fired {
                        // Source dropped without cancelling.
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            _ = signal => {}
            _ = deadline => {}
        }
    }
}

/// The per-request timeout linked with a caller token.
///
/// Fires when either source fires; the first one wins.
#[derive(Debug)]
pub struct LinkedCancel {
    timeout: Duration,
    deadline: Option<Instant>,
    caller: CancelToken,
}

impl LinkedCancel {
    /// Start the timeout clock now. A timeout too large to represent never fires.
    pub fn new(timeout: Duration, caller: &CancelToken) -> Self {
        Self {
            timeout,
            deadline: Instant::now().checked_add(timeout),
            caller: caller.clone(),
        }
    }

    /// Resolve with the reason of whichever source fires first.
    pub async fn fired(&self) -> CancelReason {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.caller.cancelled() => CancelReason::Caller,
            _ = deadline => CancelReason::Timeout(self.timeout),
        }
    }
}
