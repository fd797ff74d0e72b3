//! Flow-rate schedule
//!
//! Square-wave alternation between a high and a low flow rate, phase-locked
//! to the active-episode origin.  Without an alternation window the static
//! flow rate applies throughout.

use crate::config::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowSchedule {
    /// A single flow rate for the whole episode.
    Static(f64),
    /// `high` during even windows, `low` during odd ones.
    Alternating { high: f64, low: f64, window: f64 },
}

impl FlowSchedule {
    pub fn from_config(config: &SessionConfig) -> Self {
        match config.alternation_time {
            Some(window) => Self::Alternating {
                high: config.flowrate_high,
                low: config.flowrate_low,
                window,
            },
            None => Self::Static(config.flowrate),
        }
    }

    /// Target flow rate (mL/min) at `t_rel` seconds into the active episode.
    pub fn target(&self, t_rel: f64) -> f64 {
        match *self {
            Self::Static(flow) => flow,
            Self::Alternating { high, low, window } => {
                let index = (t_rel / window).floor();
                if index.rem_euclid(2.0) == 0.0 { high } else { low }
            }
        }
    }
}
