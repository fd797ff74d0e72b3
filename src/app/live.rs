//! Live session: the strip state machine plus its context.
//!
//! One `LiveSession` spans from a pre-onset baseline through any number of
//! active episodes.  Replay mode discards it; returning to live builds a
//! fresh one in pre-onset.

use crate::config::SessionConfig;
use crate::control::strip::StripFrame;
use crate::error::{ReadingError, Result};
use crate::fsm::context::{FsmContext, Origin, Reading};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

use super::events::TickOutput;

pub struct LiveSession {
    fsm: Fsm,
    ctx: FsmContext,
}

impl LiveSession {
    /// Validate `config` and start in pre-onset.
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    pub(crate) fn from_validated(config: SessionConfig) -> Self {
        let mut ctx = FsmContext::new(config);
        let mut fsm = Fsm::new(build_state_table(), StateId::PreOnset);
        fsm.start(&mut ctx);
        Self { fsm, ctx }
    }

    /// Run one control tick.
    ///
    /// A non-finite position fails the tick and leaves the session state
    /// untouched.
    pub fn tick(&mut self, time: f64, reading: &Reading) -> Result<TickOutput> {
        if !time.is_finite() {
            return Err(ReadingError::NonFiniteTime.into());
        }
        if !reading.posx.is_finite() || !reading.posy.is_finite() {
            log::warn!(
                "rejected reading at t={:.3}: x={} y={}",
                time,
                reading.posx,
                reading.posy
            );
            return Err(ReadingError::NonFinitePosition.into());
        }

        self.ctx.set_input(time, *reading);
        self.fsm.tick(&mut self.ctx);

        Ok(TickOutput {
            setpoints: self.ctx.setpoints,
            diagnostics: self.ctx.diagnostics,
        })
    }

    pub fn phase(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Origin of the running active episode.
    pub fn origin(&self) -> Option<Origin> {
        self.ctx.origin
    }

    /// Strip geometry of the latest active tick.
    pub fn frame(&self) -> Option<StripFrame> {
        self.ctx.frame
    }

    /// Scheduled flow rate (mL/min) of the latest active tick.
    pub fn target_flowrate(&self) -> Option<f64> {
        self.ctx.target_flowrate
    }

    pub fn config(&self) -> &SessionConfig {
        &self.ctx.config
    }
}
