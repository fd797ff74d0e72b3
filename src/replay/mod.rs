//! Instant replay: play back a recorded flow setpoint stream in lockstep
//! with the live clock.
//!
//! ```text
//!   recording ──▶ ReplayBuffer ──▶ ReplayEngine::tick(time) ──▶ FlowSetpoint
//!                 (front-to-back,    ├─ in window  → pop + emit
//!                  destructive)      ├─ early      → wait, pop + emit
//!                                    ├─ late       → drain stale, re-check
//!                                    └─ empty      → Exhausted
//! ```

pub mod buffer;
pub mod engine;

pub use buffer::{FlowSetpoint, ReplayBuffer, ReplayEntry};
pub use engine::{ReplayEngine, ReplayStep};
