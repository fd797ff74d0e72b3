//! Replay buffer: the recorded flow stream, consumed front to back.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::app::events::TickRecord;
use crate::config::PreAirFilter;
use crate::error::{Error, Result};
use crate::fsm::context::{RunMode, Setpoints};

/// The flow part of a setpoint.  LEDs are not replayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowSetpoint {
    pub air: f64,
    pub odor1: f64,
    pub odor2: f64,
}

impl FlowSetpoint {
    pub fn new(air: f64, odor1: f64, odor2: f64) -> Self {
        Self { air, odor1, odor2 }
    }

    /// Full setpoint with both LED channels off.
    pub fn with_leds_off(self) -> Setpoints {
        Setpoints {
            air: self.air,
            odor1: self.odor1,
            odor2: self.odor2,
            led1: 0.0,
            led2: 0.0,
        }
    }
}

impl From<Setpoints> for FlowSetpoint {
    fn from(s: Setpoints) -> Self {
        Self::new(s.air, s.odor1, s.odor2)
    }
}

/// One recorded row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayEntry {
    /// Session time the setpoint was originally emitted at (seconds).
    pub timestamp: f64,
    pub setpoint: FlowSetpoint,
}

impl ReplayEntry {
    pub fn new(timestamp: f64, setpoint: FlowSetpoint) -> Self {
        Self {
            timestamp,
            setpoint,
        }
    }
}

/// Time-ascending queue of recorded setpoints.  Each entry is used at most
/// once; an empty buffer is the normal end of a replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayBuffer {
    entries: VecDeque<ReplayEntry>,
}

impl ReplayBuffer {
    /// Build from entries that must be finite and in non-decreasing time order.
    pub fn from_entries(entries: Vec<ReplayEntry>) -> Result<Self> {
        let mut prev = f64::NEG_INFINITY;
        for (i, e) in entries.iter().enumerate() {
            if !e.timestamp.is_finite() {
                return Err(Error::Source(format!("entry {i}: non-finite timestamp")));
            }
            if e.timestamp < prev {
                return Err(Error::Source(format!(
                    "entry {i}: timestamp {} precedes {}",
                    e.timestamp, prev
                )));
            }
            prev = e.timestamp;
        }
        Ok(Self {
            entries: entries.into(),
        })
    }

    /// Build from a live recording.  Rows the replay engine produced are
    /// skipped; `filter` optionally drops the pre-air baseline.
    pub fn from_records<'a, I>(records: I, filter: PreAirFilter) -> Result<Self>
    where
        I: IntoIterator<Item = &'a TickRecord>,
    {
        let entries = records
            .into_iter()
            .filter(|r| r.diagnostics.mode == RunMode::Live)
            .filter(|r| match filter {
                PreAirFilter::Include => true,
                PreAirFilter::ExcludeBefore(t) => r.time >= t,
            })
            .map(|r| ReplayEntry::new(r.time, r.setpoints.into()))
            .collect();
        Self::from_entries(entries)
    }

    pub fn front(&self) -> Option<&ReplayEntry> {
        self.entries.front()
    }

    pub fn pop_front(&mut self) -> Option<ReplayEntry> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
