//! Controller replay mode: lockstep emission, catch-up and exhaustion.

use stripvr::app::commands::AppCommand;
use stripvr::app::events::AppEvent;
use stripvr::app::service::Controller;
use stripvr::config::SessionConfig;
use stripvr::error::Error;
use stripvr::fsm::StateId;
use stripvr::fsm::context::{Reading, RunMode, Setpoints};
use stripvr::replay::{FlowSetpoint, ReplayBuffer, ReplayEntry};

use super::mock_ports::{CancelledWaiter, EventLog, RecordingWaiter};

const A: FlowSetpoint = FlowSetpoint {
    air: 0.3,
    odor1: 0.0,
    odor2: 0.0,
};
const B: FlowSetpoint = FlowSetpoint {
    air: 0.24,
    odor1: 0.06,
    odor2: 0.0,
};
const C: FlowSetpoint = FlowSetpoint {
    air: 0.016,
    odor1: 0.004,
    odor2: 0.0,
};

fn replaying(entries: &[(f64, FlowSetpoint)]) -> (Controller, EventLog) {
    let mut c = Controller::new(SessionConfig::default()).unwrap();
    let mut events = EventLog::default();
    let buffer = ReplayBuffer::from_entries(
        entries
            .iter()
            .map(|&(t, s)| ReplayEntry::new(t, s))
            .collect(),
    )
    .unwrap();
    c.handle_command(AppCommand::BeginReplay(buffer), &mut events);
    (c, events)
}

#[test]
fn waits_emits_then_drains_to_live() {
    let (mut c, mut events) = replaying(&[(1.0, A), (2.0, B), (3.0, C)]);
    let mut waiter = RecordingWaiter::default();
    let r = Reading::default();

    let first = c.tick(0.9, &r, &mut waiter, &mut events).unwrap();
    assert_eq!(first.setpoints, A.with_leds_off());
    assert_eq!(first.diagnostics.mode, RunMode::Replay);
    assert_eq!(waiter.waits, vec![(0.9, 1.0)]);

    let second = c.tick(2.05, &r, &mut waiter, &mut events).unwrap();
    assert_eq!(second.setpoints, B.with_leds_off());
    assert_eq!(waiter.waits.len(), 1);

    let last = c.tick(10.0, &r, &mut waiter, &mut events).unwrap();
    assert_eq!(last.setpoints, Setpoints::zero());
    assert_eq!(last.diagnostics.mode, RunMode::Live);
    assert_eq!(c.mode(), RunMode::Live);
    assert_eq!(c.phase(), Some(StateId::PreOnset));

    assert!(events.events.contains(&AppEvent::ReplaySkipped { at: 10.0, count: 1 }));
    assert!(events.events.contains(&AppEvent::ModeChanged {
        from: RunMode::Replay,
        to: RunMode::Live
    }));
}

#[test]
fn catch_up_emits_only_one_fresh_setpoint() {
    let (mut c, mut events) = replaying(&[(1.0, A), (1.1, A), (1.2, A), (1.3, B), (5.0, C)]);
    let mut waiter = RecordingWaiter::default();

    let out = c
        .tick(1.3, &Reading::default(), &mut waiter, &mut events)
        .unwrap();
    assert_eq!(out.setpoints, B.with_leds_off());
    assert_eq!(c.replay_remaining(), Some(1));
    assert!(events.events.contains(&AppEvent::ReplaySkipped { at: 1.3, count: 3 }));
    assert!(waiter.waits.is_empty());
}

#[test]
fn catch_up_waits_for_a_future_front() {
    // Everything before 4.0 is stale at t=3.5; the next entry is still ahead.
    let (mut c, mut events) = replaying(&[(1.0, A), (2.0, B), (4.0, C)]);
    let mut waiter = RecordingWaiter::default();

    let out = c
        .tick(3.5, &Reading::default(), &mut waiter, &mut events)
        .unwrap();
    assert_eq!(out.setpoints, C.with_leds_off());
    assert_eq!(waiter.waits, vec![(3.5, 4.0)]);
}

#[test]
fn cancelled_wait_keeps_the_entry() {
    let (mut c, mut events) = replaying(&[(5.0, A)]);
    let err = c
        .tick(1.0, &Reading::default(), &mut CancelledWaiter, &mut events)
        .unwrap_err();
    assert_eq!(err, Error::Interrupted);
    assert_eq!(c.mode(), RunMode::Replay);
    assert_eq!(c.replay_remaining(), Some(1));

    let out = c
        .tick(5.0, &Reading::default(), &mut RecordingWaiter::default(), &mut events)
        .unwrap();
    assert_eq!(out.setpoints, A.with_leds_off());
}

#[test]
fn replay_then_live_runs_a_fresh_session() {
    let (mut c, mut events) = replaying(&[(0.0, B)]);
    let mut waiter = RecordingWaiter::default();
    let r = Reading::default();

    c.tick(0.0, &r, &mut waiter, &mut events).unwrap();
    c.tick(0.5, &r, &mut waiter, &mut events).unwrap();
    assert_eq!(c.mode(), RunMode::Live);

    // Back in pre-onset: the baseline, not the strip.
    let out = c.tick(1.0, &r, &mut waiter, &mut events).unwrap();
    assert_eq!(out.setpoints, Setpoints::baseline(300.0));
    assert!(c.live().and_then(|s| s.origin()).is_none());
}
