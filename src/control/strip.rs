//! Strip geometry
//!
//! Maps a position relative to the session origin onto the virtual odor
//! strip: optional periodic wrapping of x, the strip's lateral center at the
//! current y, and the half-width threshold measured along x.

use crate::config::{SessionConfig, StripDirection};

/// Geometry of one tick, all in origin-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripFrame {
    /// Relative x, wrapped into the period when the arena is periodic.
    pub x: f64,
    /// Relative y (never wrapped).
    pub y: f64,
    /// Strip center along x at this y.
    pub adapted_center: f64,
    /// Strip half-width along x.
    pub strip_thresh: f64,
}

impl StripFrame {
    /// True if the subject is inside the strip.
    pub fn in_strip(&self) -> bool {
        (self.x - self.adapted_center).abs() <= self.strip_thresh
    }
}

/// Precomputed strip parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripGeometry {
    /// Period width when wrapping is enabled.
    period: Option<f64>,
    /// tan(angle), negated for left-leaning strips.
    slope: f64,
    strip_thresh: f64,
}

impl StripGeometry {
    /// Build from a validated config.  `strip_angle` must not be 90°.
    pub fn from_config(config: &SessionConfig) -> Self {
        let tan = config.strip_angle.to_radians().tan();
        let slope = match config.strip_direction {
            StripDirection::Left => -tan,
            StripDirection::Right => tan,
        };
        let strip_thresh =
            (config.strip_width / 2.0) / (90.0 - config.strip_angle).to_radians().sin();
        Self {
            period: config.periodic_boundary.then_some(config.period_width),
            slope,
            strip_thresh,
        }
    }

    /// Evaluate the strip at an origin-relative position.
    pub fn compute(&self, x_rel: f64, y_rel: f64) -> StripFrame {
        let x = match self.period {
            Some(period) => wrap_periodic(x_rel, period),
            None => x_rel,
        };
        StripFrame {
            x,
            y: y_rel,
            adapted_center: y_rel * self.slope,
            strip_thresh: self.strip_thresh,
        }
    }

    /// Half-width of the strip along x.
    pub fn strip_thresh(&self) -> f64 {
        self.strip_thresh
    }
}

/// Wrap `x` into `[-period/2, period/2)`.
///
/// Uses the Euclidean remainder so negative inputs land in the same
/// interval as positive ones.
pub fn wrap_periodic(x: f64, period: f64) -> f64 {
    let half = period / 2.0;
    let mut r = (x + half).rem_euclid(period);
    // rem_euclid may round up to exactly `period` for tiny negative inputs.
    if r >= period {
        r = 0.0;
    }
    r - half
}
