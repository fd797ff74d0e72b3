//! Port traits: the boundary between the controller and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! The acquisition loop owns the adapters and hands them to the
//! [`Controller`](super::service::Controller) per call, so the core never
//! touches the tracker, the clock, or the log file directly.

use crate::config::{PreAirFilter, SessionConfig};
use crate::error::Result;
use crate::fsm::context::Reading;
use crate::replay::ReplayBuffer;

use super::events::{AppEvent, TickRecord};

// ───────────────────────────────────────────────────────────────
// Input ports
// ───────────────────────────────────────────────────────────────

/// Subject tracker.  Called once per tick.
pub trait PositionSource {
    /// Position of the subject at session time `time` (seconds).
    fn read(&mut self, time: f64) -> Reading;
}

/// Monotonic session clock.
pub trait Clock {
    /// Seconds since an arbitrary session-relative zero.  Never decreases.
    fn now(&self) -> f64;
}

/// The replay engine's suspend point.
///
/// Implementations block the calling thread from `now` until `deadline`
/// (both session seconds) and must be interruptible: a cancelled wait
/// returns [`Error::Interrupted`](crate::error::Error::Interrupted).
pub trait Waiter {
    fn wait_until(&mut self, now: f64, deadline: f64) -> Result<()>;
}

/// Loads and validates session configuration.
pub trait ConfigPort {
    fn load(&self) -> Result<SessionConfig>;
}

/// Supplies the recorded setpoint stream for an instant replay.
pub trait ReplaySource {
    fn load(&mut self, filter: PreAirFilter) -> Result<ReplayBuffer>;
}

// ───────────────────────────────────────────────────────────────
// Output ports
// ───────────────────────────────────────────────────────────────

/// Receives structured [`AppEvent`]s (transitions, replay catch-ups).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

/// Appends one row per tick to the session log.
pub trait TickLog {
    fn append(&mut self, record: &TickRecord) -> Result<()>;
}
