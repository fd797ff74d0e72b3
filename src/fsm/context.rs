//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the current tick's time and position reading, the session
//! origin, the setpoint outputs and the diagnostic record.

use serde::{Deserialize, Serialize};

use crate::config::{InStripLed, SessionConfig};
use crate::control::flowrate::FlowSchedule;
use crate::control::strip::{StripFrame, StripGeometry};

// ---------------------------------------------------------------------------
// Position reading (read-only to state handlers; written by the caller)
// ---------------------------------------------------------------------------

/// One sample from the subject tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Absolute x in the tracking frame (mm).
    pub posx: f64,
    /// Absolute y in the tracking frame (mm).
    pub posy: f64,
    /// Heading (radians).  Carried for the log; the controller ignores it.
    pub heading: f64,
}

impl Reading {
    pub fn new(posx: f64, posy: f64, heading: f64) -> Self {
        Self { posx, posy, heading }
    }
}

// ---------------------------------------------------------------------------
// Setpoints (written by state handlers; consumed by the acquisition loop)
// ---------------------------------------------------------------------------

/// Per-tick channel commands, already scaled for the flow controller
/// (mL/min divided by 1000).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Setpoints {
    pub air: f64,
    pub odor1: f64,
    pub odor2: f64,
    pub led1: f64,
    pub led2: f64,
}

impl Setpoints {
    /// Everything off.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Clean air at `flowrate` mL/min with the marker LED on.
    pub fn baseline(flowrate: f64) -> Self {
        Self {
            air: flowrate / 1000.0,
            odor1: 0.0,
            odor2: 0.0,
            led1: 1.0,
            led2: 0.0,
        }
    }

    /// Odorized flow: `percent_odor` of the total goes through odor channel 1,
    /// the remainder stays clean air.
    pub fn in_strip(flowrate: f64, percent_odor: f64, led: InStripLed) -> Self {
        let total = flowrate / 1000.0;
        let odor1 = total * (percent_odor / 100.0);
        let led1 = match led {
            InStripLed::MarkerOn => 1.0,
            InStripLed::AllOff => 0.0,
        };
        Self {
            air: total - odor1,
            odor1,
            odor2: 0.0,
            led1,
            led2: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Whether the live state machine or the replay engine produced a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Live,
    Replay,
}

/// Named per-tick values handed to the log writer.  Produced fresh each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub instrip: bool,
    /// Absent outside an active episode.
    pub adapted_center: Option<f64>,
    /// Absent outside an active episode.
    pub strip_thresh: Option<f64>,
    pub mode: RunMode,
}

impl Diagnostics {
    /// Outside the strip with no active geometry.
    pub fn cleared(mode: RunMode) -> Self {
        Self {
            instrip: false,
            adapted_center: None,
            strip_thresh: None,
            mode,
        }
    }
}

// ---------------------------------------------------------------------------
// Session origin
// ---------------------------------------------------------------------------

/// Time and position latched at the start of an active episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    pub time: f64,
    pub x: f64,
    pub y: f64,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Session time of the current tick (seconds).
    pub now: f64,

    // -- Input --
    pub reading: Reading,

    // -- Session state --
    /// `Some` exactly while an active episode is running.
    pub origin: Option<Origin>,
    /// Geometry of the latest active tick.
    pub frame: Option<StripFrame>,
    /// Scheduled flow rate of the latest active tick (mL/min).
    pub target_flowrate: Option<f64>,

    // -- Outputs --
    pub setpoints: Setpoints,
    pub diagnostics: Diagnostics,

    // -- Configuration --
    pub config: SessionConfig,
    pub geometry: StripGeometry,
    pub schedule: FlowSchedule,
}

impl FsmContext {
    /// Create a new context.  `config` must already be validated.
    pub fn new(config: SessionConfig) -> Self {
        let geometry = StripGeometry::from_config(&config);
        let schedule = FlowSchedule::from_config(&config);
        Self {
            ticks_in_state: 0,
            now: 0.0,
            reading: Reading::default(),
            origin: None,
            frame: None,
            target_flowrate: None,
            setpoints: Setpoints::baseline(config.flowrate),
            diagnostics: Diagnostics::cleared(RunMode::Live),
            config,
            geometry,
            schedule,
        }
    }

    /// Load the inputs for the next tick.
    pub fn set_input(&mut self, now: f64, reading: Reading) {
        self.now = now;
        self.reading = reading;
    }

    /// Seconds since the active episode began, if one is running.
    pub fn episode_time(&self) -> Option<f64> {
        self.origin.map(|o| self.now - o.time)
    }
}
