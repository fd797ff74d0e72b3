//! Session configuration parameters
//!
//! All tunable parameters for one rig session.  Loaded once before the
//! first tick and treated as read-only for the session's lifetime.
//! Defaults reproduce the alternating-wind strip session.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which way an angled strip leans as the subject travels along +y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripDirection {
    Left,
    Right,
}

/// LED pattern while the subject is inside the strip.
///
/// Sibling rig sessions disagree here: some keep the marker LED lit,
/// others blank both channels while odor flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InStripLed {
    /// LED1 full, LED2 off (same as the baseline pattern).
    #[default]
    MarkerOn,
    /// Both LED channels off.
    AllOff,
}

/// Which recorded rows an instant replay plays back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreAirFilter {
    /// Replay the full recording, pre-air baseline included.
    Include,
    /// Replay only rows at or after the given session time.
    ExcludeBefore(f64),
}

/// Instant-replay switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Run an instant replay of the recorded live session once it ends.
    pub instant_replay: bool,
    /// Replay the pre-air baseline too, not just the post-onset rows.
    pub include_pre_air: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            instant_replay: false,
            include_pre_air: true,
        }
    }
}

/// Core session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    // --- Strip ---
    /// Strip angle in degrees; must not be 90.
    pub strip_angle: f64,
    pub strip_direction: StripDirection,
    /// Strip width in mm.
    pub strip_width: f64,
    /// Wrap x so the strip repeats every `period_width`.
    pub periodic_boundary: bool,
    /// Period of the repeating strip pattern in mm.
    pub period_width: f64,
    /// Absolute |y| travel (mm) past which the active episode ends.
    pub edge_bound: f64,

    // --- Flow ---
    /// Static flow rate in standard mL/min.
    pub flowrate: f64,
    /// Flow rate during the even alternation windows.
    pub flowrate_high: f64,
    /// Flow rate during the odd alternation windows.
    pub flowrate_low: f64,
    /// Alternation window length in seconds.  `None` disables alternation.
    pub alternation_time: Option<f64>,
    /// Fraction of the flow routed through odor channel 1 (0-100%).
    pub percent_odor: f64,
    /// Clean-air baseline before the strip switches on (seconds).
    pub pre_onset_time: f64,

    // --- LEDs (device-facing, passed through) ---
    pub led_intensity: f64,
    pub led_color: String,
    pub led_policy: InStripLed,

    // --- Acquisition loop ---
    /// Sliding window length for downstream statistics.
    pub window_len: u32,
    /// Hardware pulse period (seconds).
    pub pulse_period: f64,

    // --- Replay ---
    pub replay: ReplayConfig,
    /// Half-width of the lockstep window between live and recorded clocks.
    pub replay_tolerance: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // Strip
            strip_angle: 0.0,
            strip_direction: StripDirection::Right,
            strip_width: 10.0,
            periodic_boundary: true,
            period_width: 200.0,
            edge_bound: 100_000.0,

            // Flow
            flowrate: 300.0,
            flowrate_high: 300.0,
            flowrate_low: 20.0,
            alternation_time: Some(120.0),
            percent_odor: 20.0,
            pre_onset_time: 60.0,

            // LEDs
            led_intensity: 0.0,
            led_color: "red".to_string(),
            led_policy: InStripLed::MarkerOn,

            // Acquisition loop
            window_len: 120,
            pulse_period: 10.0,

            // Replay
            replay: ReplayConfig::default(),
            replay_tolerance: 0.05,
        }
    }
}

impl SessionConfig {
    /// Reject configurations the controller cannot run.
    ///
    /// Called by every controller constructor; nothing is re-checked per tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("strip_angle", self.strip_angle),
            ("strip_width", self.strip_width),
            ("period_width", self.period_width),
            ("edge_bound", self.edge_bound),
            ("flowrate", self.flowrate),
            ("flowrate_high", self.flowrate_high),
            ("flowrate_low", self.flowrate_low),
            ("percent_odor", self.percent_odor),
            ("pre_onset_time", self.pre_onset_time),
            ("replay_tolerance", self.replay_tolerance),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite(field));
            }
        }

        if (90.0 - self.strip_angle).to_radians().sin().abs() < 1e-9 {
            return Err(ConfigError::DegenerateAngle);
        }
        if self.strip_width <= 0.0 || self.edge_bound <= 0.0 {
            return Err(ConfigError::NonPositiveWidth);
        }
        if self.periodic_boundary && self.period_width <= 0.0 {
            return Err(ConfigError::NonPositivePeriod);
        }
        if let Some(t) = self.alternation_time {
            if !t.is_finite() {
                return Err(ConfigError::NonFinite("alternation_time"));
            }
            if t <= 0.0 {
                return Err(ConfigError::NonPositiveAlternation);
            }
        }
        if !(0.0..=100.0).contains(&self.percent_odor) {
            return Err(ConfigError::PercentOutOfRange);
        }
        if self.flowrate < 0.0 || self.flowrate_high < 0.0 || self.flowrate_low < 0.0 {
            return Err(ConfigError::NegativeFlowrate);
        }
        if self.pre_onset_time < 0.0 || self.replay_tolerance < 0.0 {
            return Err(ConfigError::NegativeTime);
        }
        Ok(())
    }

    /// Replay row filter implied by `replay.include_pre_air`.
    pub fn pre_air_filter(&self) -> PreAirFilter {
        if self.replay.include_pre_air {
            PreAirFilter::Include
        } else {
            PreAirFilter::ExcludeBefore(self.pre_onset_time)
        }
    }

    /// Parse a TOML document.  Missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))
    }
}
