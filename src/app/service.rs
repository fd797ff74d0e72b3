//! Controller: the per-tick entry point for the acquisition loop.
//!
//! [`Controller`] owns either a live session or a replay engine, never
//! both.  All I/O flows through port traits passed in per call, so the
//! whole controller runs against mock adapters in tests.
//!
//! ```text
//!  (time, Reading) ──▶ ┌─────────────────────────────┐ ──▶ TickOutput
//!                      │          Controller          │
//!         Waiter ◀──── │  Live(LiveSession)           │ ──▶ EventSink
//!                      │  Replay(ReplayEngine)        │
//!                      └─────────────────────────────┘
//! ```
//!
//! Replay → Live happens automatically when the buffer runs dry; Live →
//! Replay only on [`AppCommand::BeginReplay`].

use log::{info, warn};

use crate::config::SessionConfig;
use crate::error::{ReadingError, Result};
use crate::fsm::StateId;
use crate::fsm::context::{Diagnostics, Reading, RunMode, Setpoints};
use crate::replay::{ReplayEngine, ReplayStep};

use super::commands::AppCommand;
use super::events::{AppEvent, TickOutput};
use super::live::LiveSession;
use super::ports::{EventSink, Waiter};

/// What is currently driving the outputs.
enum Mode {
    Live(LiveSession),
    Replay(ReplayEngine),
}

pub struct Controller {
    mode: Mode,
    config: SessionConfig,
    tick_count: u64,
    /// Session time the last tick's replayed setpoint went out.
    replay_emitted_at: Option<f64>,
}

impl Controller {
    /// Validate `config` and start live, in pre-onset.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let live = LiveSession::new(config.clone())?;
        Ok(Self {
            mode: Mode::Live(live),
            config,
            tick_count: 0,
            replay_emitted_at: None,
        })
    }

    /// Announce the starting mode.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started(self.mode()));
        info!("Controller started in {:?} mode", self.mode());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control tick.
    ///
    /// Blocks only in replay mode, when the next recorded entry lies in the
    /// future; cancelling `waiter` then fails the tick with
    /// [`Error::Interrupted`](crate::error::Error::Interrupted).
    pub fn tick(
        &mut self,
        time: f64,
        reading: &Reading,
        waiter: &mut impl Waiter,
        sink: &mut impl EventSink,
    ) -> Result<TickOutput> {
        if !time.is_finite() {
            return Err(ReadingError::NonFiniteTime.into());
        }
        self.tick_count += 1;
        self.replay_emitted_at = None;

        match &mut self.mode {
            Mode::Live(session) => {
                let prev = session.phase();
                let output = session.tick(time, reading)?;
                let next = session.phase();
                if next != prev {
                    sink.emit(&AppEvent::PhaseChanged {
                        from: prev,
                        to: next,
                    });
                    if let Some(origin) = session.origin() {
                        sink.emit(&AppEvent::OriginLatched {
                            time: origin.time,
                            x: origin.x,
                            y: origin.y,
                        });
                    }
                }
                Ok(output)
            }
            Mode::Replay(engine) => match engine.tick(time, waiter)? {
                ReplayStep::Emit {
                    setpoint,
                    timestamp,
                    skipped,
                } => {
                    // An early tick waited until the entry was due.
                    self.replay_emitted_at = Some(time.max(timestamp));
                    if skipped > 0 {
                        sink.emit(&AppEvent::ReplaySkipped {
                            at: time,
                            count: skipped,
                        });
                    }
                    Ok(TickOutput {
                        setpoints: setpoint.with_leds_off(),
                        diagnostics: Diagnostics::cleared(RunMode::Replay),
                    })
                }
                ReplayStep::Exhausted { skipped } => {
                    if skipped > 0 {
                        sink.emit(&AppEvent::ReplaySkipped {
                            at: time,
                            count: skipped,
                        });
                    }
                    info!("END OF REPLAY at t={:.3}, re-arming live session", time);
                    self.enter_live(sink);
                    Ok(TickOutput {
                        setpoints: Setpoints::zero(),
                        diagnostics: Diagnostics::cleared(RunMode::Live),
                    })
                }
            },
        }
    }

    // ── Command handling ──────────────────────────────────────

    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::BeginReplay(buffer) => {
                if buffer.is_empty() {
                    warn!("BeginReplay with an empty buffer; replay will end on the next tick");
                }
                let from = self.mode();
                self.mode = Mode::Replay(ReplayEngine::new(buffer, self.config.replay_tolerance));
                sink.emit(&AppEvent::ModeChanged {
                    from,
                    to: RunMode::Replay,
                });
            }
            AppCommand::ReturnToLive => self.enter_live(sink),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> RunMode {
        match self.mode {
            Mode::Live(_) => RunMode::Live,
            Mode::Replay(_) => RunMode::Replay,
        }
    }

    /// Live phase; `None` while replaying.
    pub fn phase(&self) -> Option<StateId> {
        match &self.mode {
            Mode::Live(session) => Some(session.phase()),
            Mode::Replay(_) => None,
        }
    }

    /// The live session, if live.
    pub fn live(&self) -> Option<&LiveSession> {
        match &self.mode {
            Mode::Live(session) => Some(session),
            Mode::Replay(_) => None,
        }
    }

    /// Entries left to replay; `None` while live.
    pub fn replay_remaining(&self) -> Option<usize> {
        match &self.mode {
            Mode::Live(_) => None,
            Mode::Replay(engine) => Some(engine.remaining()),
        }
    }

    /// When the last tick emitted a recorded setpoint, the session time it
    /// went out at: the entry's timestamp if the tick had to wait for it,
    /// otherwise the tick time.  `None` after live and exhaustion ticks.
    pub fn replay_emitted_at(&self) -> Option<f64> {
        self.replay_emitted_at
    }

    /// Total ticks executed since construction.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Replace the current mode with a fresh live session in pre-onset.
    fn enter_live(&mut self, sink: &mut impl EventSink) {
        let from = self.mode();
        self.mode = Mode::Live(LiveSession::from_validated(self.config.clone()));
        sink.emit(&AppEvent::ModeChanged {
            from,
            to: RunMode::Live,
        });
    }
}
