//! Host time adapters.
//!
//! - [`SessionClock`]: monotonic seconds since the session (or the last
//!   [`restart`](SessionClock::restart)) began, from `std::time::Instant`.
//! - [`ThreadWaiter`]: blocks the calling thread for the replay engine,
//!   sleeping in bounded slices so a shared cancel flag can cut the wait
//!   short.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::debug;

use crate::app::ports::{Clock, Waiter};
use crate::error::{Error, Result};

/// Longest uninterrupted sleep inside a wait.
const DEFAULT_SLICE: Duration = Duration::from_millis(10);

/// Monotonic session clock.
#[derive(Debug, Clone)]
pub struct SessionClock {
    start: Instant,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Reset session zero to now (e.g. at the start of an instant replay).
    pub fn restart(&mut self) {
        self.start = Instant::now();
    }
}

impl Clock for SessionClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Interruptible sleeping [`Waiter`].
#[derive(Debug, Clone)]
pub struct ThreadWaiter {
    cancel: Arc<AtomicBool>,
    slice: Duration,
}

impl ThreadWaiter {
    /// `cancel` is shared with whoever may abort the session (e.g. a
    /// Ctrl-C handler).  Once set, every pending and future wait fails.
    pub fn new(cancel: Arc<AtomicBool>) -> Self {
        Self {
            cancel,
            slice: DEFAULT_SLICE,
        }
    }

    /// Override the polling slice.
    pub fn with_slice(mut self, slice: Duration) -> Self {
        self.slice = slice;
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }
}

impl Waiter for ThreadWaiter {
    fn wait_until(&mut self, now: f64, deadline: f64) -> Result<()> {
        if self.cancelled() {
            return Err(Error::Interrupted);
        }
        let remaining = deadline - now;
        if !remaining.is_finite() || remaining <= 0.0 {
            return Ok(());
        }
        debug!("waiting {:.3}s for replay entry", remaining);

        // `None` when the deadline lies beyond what `Instant` can represent;
        // only cancellation ends such a wait.
        let end = Duration::try_from_secs_f64(remaining)
            .ok()
            .and_then(|d| Instant::now().checked_add(d));
        loop {
            if self.cancelled() {
                return Err(Error::Interrupted);
            }
            let left = match end {
                Some(end) => end.saturating_duration_since(Instant::now()),
                None => self.slice,
            };
            if left.is_zero() {
                return Ok(());
            }
            std::thread::sleep(left.min(self.slice));
        }
    }
}
