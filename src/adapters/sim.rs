//! Simulated subject tracker for bench runs without a rig.

use crate::app::ports::PositionSource;
use crate::fsm::context::Reading;

/// Walks a straight line at constant speed from a start point.
///
/// Heading is in radians, measured from +y toward +x, so heading 0 walks
/// straight up the arena.
#[derive(Debug, Clone)]
pub struct SimulatedTracker {
    start: (f64, f64),
    speed: f64,
    heading: f64,
    start_time: Option<f64>,
}

impl SimulatedTracker {
    /// `speed` in mm/s.
    pub fn new(x: f64, y: f64, speed: f64, heading: f64) -> Self {
        Self {
            start: (x, y),
            speed,
            heading,
            start_time: None,
        }
    }

    /// A subject that never moves.
    pub fn stationary(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 0.0)
    }
}

impl PositionSource for SimulatedTracker {
    fn read(&mut self, time: f64) -> Reading {
        let t0 = *self.start_time.get_or_insert(time);
        let dist = self.speed * (time - t0);
        let (sin, cos) = self.heading.sin_cos();
        Reading::new(
            self.start.0 + dist * sin,
            self.start.1 + dist * cos,
            self.heading,
        )
    }
}
