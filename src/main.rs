//! StripVR host binary.
//!
//! Drives the [`Controller`] from a fixed-rate loop with host adapters
//! plugged into its ports.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  SimulatedTracker  SessionClock  ThreadWaiter  LogEventSink  │
//! │  (PositionSource)  (Clock)       (Waiter)      (EventSink)   │
//! │  TomlConfigFile    JsonLinesLog / MemoryLog   JsonLinesSource│
//! │  (ConfigPort)      (TickLog)                  (ReplaySource) │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            Controller (pure logic)                     │  │
//! │  │  Live: strip FSM · flow schedule │ Replay: engine      │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod cli;

use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, info, warn};

use stripvr::adapters::config_file::TomlConfigFile;
use stripvr::adapters::log_sink::LogEventSink;
use stripvr::adapters::recorder::{JsonLinesLog, JsonLinesSource, MemoryLog};
use stripvr::adapters::sim::SimulatedTracker;
use stripvr::adapters::time::{SessionClock, ThreadWaiter};
use stripvr::app::commands::AppCommand;
use stripvr::app::events::TickRecord;
use stripvr::app::ports::{Clock, ConfigPort, PositionSource, ReplaySource, TickLog};
use stripvr::app::service::Controller;
use stripvr::config::SessionConfig;
use stripvr::control::strip::StripGeometry;
use stripvr::error::Error;
use stripvr::fsm::context::RunMode;

// ── Rig ───────────────────────────────────────────────────────
//
// Everything the acquisition loop owns besides the controller.

struct Rig {
    clock: SessionClock,
    tracker: SimulatedTracker,
    waiter: ThreadWaiter,
    sink: LogEventSink,
    file_log: Option<JsonLinesLog<BufWriter<File>>>,
    memory: Option<MemoryLog>,
    cancel: Arc<AtomicBool>,
    period: Duration,
}

/// How a stretch of ticks ended.
#[derive(Debug, PartialEq, Eq)]
enum Stop {
    /// Tick budget spent, or replay finished.
    Done,
    /// Ctrl-C.
    Cancelled,
}

impl Rig {
    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Tick until `max_ticks` ticks ran, or (with `until_live`) until the
    /// controller has fallen back to live mode.
    fn run_ticks(
        &mut self,
        controller: &mut Controller,
        max_ticks: Option<u64>,
        until_live: bool,
    ) -> Result<Stop> {
        let mut ran = 0u64;
        let mut next = Instant::now();
        loop {
            if self.cancelled() {
                return Ok(Stop::Cancelled);
            }
            if max_ticks.is_some_and(|m| ran >= m) {
                return Ok(Stop::Done);
            }
            if until_live && controller.mode() == RunMode::Live {
                return Ok(Stop::Done);
            }

            let time = self.clock.now();
            let reading = self.tracker.read(time);
            match controller.tick(time, &reading, &mut self.waiter, &mut self.sink) {
                Ok(output) => {
                    ran += 1;
                    let (air, odor1, odor2, led1, led2, diag) = output.as_tuple();
                    debug!(
                        "TICK  | t={:.3} air={:.4} odor1={:.4} odor2={:.4} led=({}, {}) instrip={} mode={:?}",
                        time, air, odor1, odor2, led1, led2, diag.instrip, diag.mode
                    );

                    let stamp = controller.replay_emitted_at().unwrap_or(time);
                    let record = TickRecord::new(stamp, &output);
                    if let Some(log) = self.file_log.as_mut() {
                        log.append(&record).context("writing session log")?;
                    }
                    if let Some(memory) = self.memory.as_mut() {
                        memory.append(&record).context("buffering session log")?;
                    }
                }
                Err(Error::Interrupted) => return Ok(Stop::Cancelled),
                Err(Error::Reading(e)) => warn!("tick skipped at t={:.3}: {}", time, e),
                Err(e) => return Err(e).context("controller tick failed"),
            }

            next += self.period;
            let now = Instant::now();
            if next > now {
                std::thread::sleep(next - now);
            } else {
                next = now;
            }
        }
    }
}

// ── Commands ──────────────────────────────────────────────────

fn load_config(path: Option<&std::path::Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => TomlConfigFile::new(path)
            .load()
            .with_context(|| format!("loading {}", path.display())),
        None => {
            info!("no config file given, using rig defaults");
            let config = SessionConfig::default();
            config.validate().map_err(Error::from)?;
            Ok(config)
        }
    }
}

fn check(config: &SessionConfig) {
    let geometry = StripGeometry::from_config(config);
    println!("strip_angle     = {} deg", config.strip_angle);
    println!("strip_direction = {:?}", config.strip_direction);
    println!("strip_width     = {} mm", config.strip_width);
    println!("strip_thresh    = {:.4} mm", geometry.strip_thresh());
    if config.periodic_boundary {
        println!("period_width    = {} mm", config.period_width);
    } else {
        println!("period_width    = (unbounded)");
    }
    match config.alternation_time {
        Some(t) => println!(
            "flow schedule   = {} / {} mL/min every {} s",
            config.flowrate_high, config.flowrate_low, t
        ),
        None => println!("flow schedule   = {} mL/min", config.flowrate),
    }
    println!("instant_replay  = {}", config.replay.instant_replay);
}

/// Loop period for a tick rate in Hz.
fn tick_period(rate: f64) -> Result<Duration> {
    if !(rate.is_finite() && rate > 0.0) {
        bail!("--rate must be a positive number of Hz, got {}", rate);
    }
    match Duration::try_from_secs_f64(1.0 / rate) {
        Ok(period) => Ok(period),
        Err(_) => bail!("--rate {} Hz gives a tick period too long to represent", rate),
    }
}

fn run(config: SessionConfig, opts: &cli::RunOpts, cancel: Arc<AtomicBool>) -> Result<()> {
    let period = tick_period(opts.rate)?;

    let instant_replay = config.replay.instant_replay;
    let filter = config.pre_air_filter();
    let mut controller = Controller::new(config).context("invalid session config")?;

    let file_log = match &opts.record {
        Some(path) => Some(
            JsonLinesLog::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => None,
    };

    let mut rig = Rig {
        clock: SessionClock::new(),
        tracker: SimulatedTracker::new(opts.start_x, opts.start_y, opts.speed, opts.heading),
        waiter: ThreadWaiter::new(cancel.clone()),
        sink: LogEventSink::new(),
        file_log,
        memory: instant_replay.then(MemoryLog::new),
        cancel,
        period,
    };

    controller.start(&mut rig.sink);

    // ── 1. Recorded replay ────────────────────────────────────
    if let Some(path) = &opts.replay {
        let buffer = JsonLinesSource::new(path)
            .load(filter)
            .with_context(|| format!("loading replay {}", path.display()))?;
        info!("replaying {} entries from {}", buffer.len(), path.display());
        controller.handle_command(AppCommand::BeginReplay(buffer), &mut rig.sink);
        rig.clock.restart();
        if rig.run_ticks(&mut controller, None, true)? == Stop::Cancelled {
            return finish(&mut rig, &controller);
        }
    }

    // ── 2. Live session ───────────────────────────────────────
    // Each segment starts its own session time; the instant replay only
    // sees this one.
    if let Some(memory) = rig.memory.as_mut() {
        memory.clear();
    }
    if opts.replay.is_some() {
        rig.clock.restart();
    }
    info!("live session: {} ticks at {} Hz", opts.ticks, opts.rate);
    if rig.run_ticks(&mut controller, Some(opts.ticks), false)? == Stop::Cancelled {
        return finish(&mut rig, &controller);
    }

    // ── 3. Instant replay ─────────────────────────────────────
    if let Some(mut memory) = rig.memory.take() {
        if let Some(log) = rig.file_log.as_mut() {
            log.flush().context("flushing session log")?;
        }
        let buffer = memory.load(filter).context("building instant replay")?;
        info!("instant replay of {} entries", buffer.len());
        controller.handle_command(AppCommand::BeginReplay(buffer), &mut rig.sink);
        rig.clock.restart();
        rig.run_ticks(&mut controller, None, true)?;
    }

    finish(&mut rig, &controller)
}

fn finish(rig: &mut Rig, controller: &Controller) -> Result<()> {
    if let Some(log) = rig.file_log.as_mut() {
        log.flush().context("flushing session log")?;
        info!("session log: {} rows", log.rows());
    }
    info!(
        "session over after {} ticks ({:?} mode)",
        controller.tick_count(),
        controller.mode()
    );
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let filter = std::env::var("STRIPVR_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    info!("stripvr v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_deref())?;

    match args.command {
        cli::Command::Check => {
            check(&config);
            Ok(())
        }
        cli::Command::Run(opts) => {
            let cancel = Arc::new(AtomicBool::new(false));
            let cancel_for_ctrlc = cancel.clone();
            ctrlc::set_handler(move || {
                cancel_for_ctrlc.store(true, Ordering::Release);
            })
            .context("installing Ctrl-C handler")?;

            run(config, &opts, cancel)
        }
    }
}
