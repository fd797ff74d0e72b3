//! Replay engine: emits one recorded flow setpoint per tick, synchronized
//! to the live clock.
//!
//! The engine never emits a stale setpoint.  When the live clock is behind
//! the recording it drains every entry more than `tolerance` old and then
//! re-classifies the new front; when it is ahead it blocks on the
//! [`Waiter`] until the entry's timestamp.  That wait is the only blocking
//! point in the controller.

use log::{debug, info};

use super::buffer::{FlowSetpoint, ReplayBuffer};
use crate::app::ports::Waiter;
use crate::error::Result;

/// Outcome of one replay tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplayStep {
    /// A recorded setpoint was consumed and should be emitted.
    Emit {
        setpoint: FlowSetpoint,
        /// Recorded time of the emitted entry.
        timestamp: f64,
        /// Stale entries dropped before it on this tick.
        skipped: usize,
    },
    /// The buffer is exhausted; the caller should return to live mode.
    Exhausted {
        /// Stale entries dropped on this tick before running dry.
        skipped: usize,
    },
}

pub struct ReplayEngine {
    buffer: ReplayBuffer,
    tolerance: f64,
    emitted: u64,
    skipped: u64,
}

impl ReplayEngine {
    /// `tolerance` is the half-width of the lockstep window (seconds).
    pub fn new(buffer: ReplayBuffer, tolerance: f64) -> Self {
        info!(
            "REPLAY: {} entries queued, tolerance ±{}s",
            buffer.len(),
            tolerance
        );
        Self {
            buffer,
            tolerance,
            emitted: 0,
            skipped: 0,
        }
    }

    /// Consume the setpoint due at `time`.
    ///
    /// Returns `Err(Error::Interrupted)` if the waiter was cancelled while
    /// waiting for a future entry; that entry stays queued.
    pub fn tick(&mut self, time: f64, waiter: &mut impl Waiter) -> Result<ReplayStep> {
        let mut skipped = 0;
        while let Some(next) = self.buffer.front() {
            let due = next.timestamp;

            if time < due - self.tolerance {
                debug!("REPLAY: t={:.3} ahead of {:.3}, waiting", time, due);
                waiter.wait_until(time, due)?;
                return Ok(self.emit_front(skipped));
            }

            if time - due <= self.tolerance {
                return Ok(self.emit_front(skipped));
            }

            // Live clock behind the recording: drop the stale entry.
            self.buffer.pop_front();
            skipped += 1;
        }

        self.note_skipped(time, skipped);
        info!(
            "REPLAY: exhausted after {} emitted, {} skipped",
            self.emitted, self.skipped
        );
        Ok(ReplayStep::Exhausted { skipped })
    }

    /// Entries still queued.
    pub fn remaining(&self) -> usize {
        self.buffer.len()
    }

    /// Setpoints emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Stale entries dropped so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn emit_front(&mut self, skipped: usize) -> ReplayStep {
        match self.buffer.pop_front() {
            Some(entry) => {
                self.note_skipped(entry.timestamp, skipped);
                self.emitted += 1;
                ReplayStep::Emit {
                    setpoint: entry.setpoint,
                    timestamp: entry.timestamp,
                    skipped,
                }
            }
            None => ReplayStep::Exhausted { skipped },
        }
    }

    fn note_skipped(&mut self, at: f64, skipped: usize) {
        if skipped > 0 {
            self.skipped += skipped as u64;
            info!("REPLAY: caught up to t={:.3}, dropped {} stale entries", at, skipped);
        }
    }
}
