//! Record a live session, then replay it: the flow stream must come back
//! tick for tick.

use stripvr::adapters::recorder::{JsonLinesLog, JsonLinesSource, MemoryLog, read_records};
use stripvr::adapters::sim::SimulatedTracker;
use stripvr::app::commands::AppCommand;
use stripvr::app::events::{TickOutput, TickRecord};
use stripvr::app::ports::{PositionSource, ReplaySource, TickLog};
use stripvr::app::service::Controller;
use stripvr::config::{PreAirFilter, SessionConfig};
use stripvr::fsm::context::{RunMode, Setpoints};
use stripvr::replay::FlowSetpoint;
use tempfile::tempdir;

use super::mock_ports::{EventLog, RecordingWaiter};

const DT: f64 = 0.5;
const TICKS: usize = 400;

fn times() -> impl Iterator<Item = f64> {
    (0..TICKS).map(|k| k as f64 * DT)
}

/// Runs a live session on a slowly drifting walker so the stream crosses
/// onset, strip entries and exits, and a flow alternation.
fn record_session(log: &mut impl TickLog) -> Vec<(f64, TickOutput)> {
    let mut c = Controller::new(SessionConfig::default()).unwrap();
    let mut tracker = SimulatedTracker::new(0.0, 0.0, 4.0, 0.02);
    let mut waiter = RecordingWaiter::default();
    let mut events = EventLog::default();

    let mut stream = Vec::new();
    for t in times() {
        let reading = tracker.read(t);
        let out = c.tick(t, &reading, &mut waiter, &mut events).unwrap();
        log.append(&TickRecord::new(t, &out)).unwrap();
        stream.push((t, out));
    }
    stream
}

fn replay(source: &mut impl ReplaySource, filter: PreAirFilter, at: &[f64]) -> Vec<TickOutput> {
    let mut c = Controller::new(SessionConfig::default()).unwrap();
    let mut waiter = RecordingWaiter::default();
    let mut events = EventLog::default();
    let buffer = source.load(filter).unwrap();
    c.handle_command(AppCommand::BeginReplay(buffer), &mut events);

    let outs = at
        .iter()
        .map(|&t| {
            c.tick(t, &Default::default(), &mut waiter, &mut events)
                .unwrap()
        })
        .collect();
    assert!(waiter.waits.is_empty(), "lockstep replay never waits");
    outs
}

#[test]
fn recorded_session_exercises_the_strip() {
    let mut log = MemoryLog::new();
    let stream = record_session(&mut log);
    let inside = stream.iter().filter(|(_, o)| o.diagnostics.instrip).count();
    assert!(inside > 0, "walker should enter the strip");
    assert!(inside < stream.len(), "walker should also leave it");
}

#[test]
fn replay_reproduces_the_recorded_flows() {
    let mut log = MemoryLog::new();
    let stream = record_session(&mut log);
    let at: Vec<f64> = stream.iter().map(|(t, _)| *t).collect();

    let replayed = replay(&mut log, PreAirFilter::Include, &at);
    for ((t, live), played) in stream.iter().zip(&replayed) {
        assert_eq!(
            FlowSetpoint::from(played.setpoints),
            FlowSetpoint::from(live.setpoints),
            "t={t}"
        );
        assert_eq!((played.setpoints.led1, played.setpoints.led2), (0.0, 0.0));
        assert_eq!(played.diagnostics.mode, RunMode::Replay);
    }
}

#[test]
fn replay_can_skip_the_pre_air_period() {
    let mut log = MemoryLog::new();
    let stream = record_session(&mut log);
    let config = SessionConfig::default();
    let onset = config.pre_onset_time;

    let after: Vec<&(f64, TickOutput)> = stream.iter().filter(|(t, _)| *t >= onset).collect();
    let at: Vec<f64> = after.iter().map(|(t, _)| *t).collect();
    let replayed = replay(&mut log, PreAirFilter::ExcludeBefore(onset), &at);

    assert_eq!(replayed.len(), after.len());
    for ((_, live), played) in after.iter().zip(&replayed) {
        assert_eq!(
            FlowSetpoint::from(played.setpoints),
            FlowSetpoint::from(live.setpoints)
        );
    }
}

#[test]
fn json_lines_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.jsonl");

    let mut file_log = JsonLinesLog::create(&path).unwrap();
    let stream = record_session(&mut file_log);
    file_log.flush().unwrap();
    assert_eq!(file_log.rows(), TICKS as u64);
    drop(file_log);

    let text = std::fs::read(&path).unwrap();
    let records = read_records(text.as_slice()).unwrap();
    assert_eq!(records.len(), TICKS);
    assert_eq!(records[0].setpoints, Setpoints::baseline(300.0));

    let at: Vec<f64> = stream.iter().map(|(t, _)| *t).collect();
    let replayed = replay(&mut JsonLinesSource::new(&path), PreAirFilter::Include, &at);
    for ((_, live), played) in stream.iter().zip(&replayed) {
        assert_eq!(
            FlowSetpoint::from(played.setpoints),
            FlowSetpoint::from(live.setpoints)
        );
    }
}

#[test]
fn replay_rows_are_not_replayed_again() {
    let mut log = MemoryLog::new();
    record_session(&mut log);
    let live_rows = log.records().len();

    // Append what the replay produced; a second load must ignore it.
    let at: Vec<f64> = times().collect();
    let replayed = replay(&mut log.clone(), PreAirFilter::Include, &at);
    for (t, out) in at.iter().zip(&replayed) {
        log.append(&TickRecord::new(*t + 1000.0, out)).unwrap();
    }

    let buffer = log.load(PreAirFilter::Include).unwrap();
    assert_eq!(buffer.len(), live_rows);
}
