//! Outbound controller data: per-tick output, log rows, and events.
//!
//! The [`Controller`](super::service::Controller) returns a [`TickOutput`]
//! every tick and emits [`AppEvent`]s through the
//! [`EventSink`](super::ports::EventSink) port when something changes.

use serde::{Deserialize, Serialize};

use crate::fsm::StateId;
use crate::fsm::context::{Diagnostics, RunMode, Setpoints};

/// Everything one tick produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    pub setpoints: Setpoints,
    pub diagnostics: Diagnostics,
}

impl TickOutput {
    /// `(air, odor1, odor2, led1, led2, diagnostics)` in hardware order.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64, f64, Diagnostics) {
        let s = self.setpoints;
        (s.air, s.odor1, s.odor2, s.led1, s.led2, self.diagnostics)
    }
}

/// One row of the session log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    /// Session time of the tick (seconds).
    pub time: f64,
    pub setpoints: Setpoints,
    pub diagnostics: Diagnostics,
}

impl TickRecord {
    pub fn new(time: f64, output: &TickOutput) -> Self {
        Self {
            time,
            setpoints: output.setpoints,
            diagnostics: output.diagnostics,
        }
    }
}

/// Structured events emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started in the given mode.
    Started(RunMode),

    /// The live state machine changed phase.
    PhaseChanged { from: StateId, to: StateId },

    /// A new active episode latched its origin.
    OriginLatched { time: f64, x: f64, y: f64 },

    /// Live ↔ replay switch.
    ModeChanged { from: RunMode, to: RunMode },

    /// The replay engine dropped stale entries to catch up with the clock.
    ReplaySkipped { at: f64, count: usize },
}
