//! Controller → live FSM → setpoints, driven through the port traits.

use stripvr::app::events::AppEvent;
use stripvr::app::ports::PositionSource;
use stripvr::app::service::Controller;
use stripvr::config::{InStripLed, SessionConfig, StripDirection};
use stripvr::error::{ConfigError, Error, ReadingError};
use stripvr::fsm::StateId;
use stripvr::fsm::context::{Reading, RunMode};

use super::mock_ports::{EventLog, RecordingWaiter, ScriptedTracker};

const EPS: f64 = 1e-12;

fn controller(config: SessionConfig) -> (Controller, RecordingWaiter, EventLog) {
    let mut c = Controller::new(config).unwrap();
    let mut events = EventLog::default();
    c.start(&mut events);
    (c, RecordingWaiter::default(), events)
}

fn at(x: f64, y: f64) -> Reading {
    Reading::new(x, y, 0.0)
}

#[test]
fn degenerate_config_fails_at_construction() {
    let bad = SessionConfig {
        periodic_boundary: true,
        period_width: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        Controller::new(bad),
        Err(Error::Config(ConfigError::NonPositivePeriod))
    ));
}

#[test]
fn pre_air_baseline_until_onset() {
    let (mut c, mut w, mut ev) = controller(SessionConfig::default());
    for t in [0.0, 10.0, 30.0, 59.99] {
        let out = c.tick(t, &at(0.0, 0.0), &mut w, &mut ev).unwrap();
        let (air, odor1, odor2, led1, led2, diag) = out.as_tuple();
        assert!((air - 0.3).abs() < EPS);
        assert_eq!((odor1, odor2, led1, led2), (0.0, 0.0, 1.0, 0.0));
        assert!(!diag.instrip);
        assert_eq!(diag.adapted_center, None);
        assert_eq!(diag.mode, RunMode::Live);
    }
    assert_eq!(c.phase(), Some(StateId::PreOnset));
}

#[test]
fn onset_latches_exactly_once() {
    let (mut c, mut w, mut ev) = controller(SessionConfig::default());
    c.tick(60.0, &at(12.0, 34.0), &mut w, &mut ev).unwrap();
    c.tick(60.0, &at(13.0, 35.0), &mut w, &mut ev).unwrap();
    c.tick(60.5, &at(14.0, 36.0), &mut w, &mut ev).unwrap();

    let origin = c.live().and_then(|s| s.origin()).unwrap();
    assert_eq!((origin.time, origin.x, origin.y), (60.0, 12.0, 34.0));
    assert_eq!(
        ev.count(|e| matches!(e, AppEvent::OriginLatched { .. })),
        1
    );
}

#[test]
fn odor_follows_the_strip_after_onset() {
    let (mut c, mut w, mut ev) = controller(SessionConfig::default());
    c.tick(60.0, &at(100.0, 100.0), &mut w, &mut ev).unwrap();

    // On the strip centerline.
    let out = c.tick(61.0, &at(100.0, 120.0), &mut w, &mut ev).unwrap();
    assert!(out.diagnostics.instrip);
    assert!((out.setpoints.odor1 - 0.06).abs() < EPS);
    assert!((out.setpoints.air - 0.24).abs() < EPS);
    assert_eq!(out.diagnostics.strip_thresh, Some(5.0));

    // Exactly on the half-width still counts as inside.
    let out = c.tick(62.0, &at(105.0, 130.0), &mut w, &mut ev).unwrap();
    assert!(out.diagnostics.instrip);

    // Off the strip: clean air, geometry still reported.
    let out = c.tick(63.0, &at(106.0, 140.0), &mut w, &mut ev).unwrap();
    assert!(!out.diagnostics.instrip);
    assert_eq!(out.setpoints.odor1, 0.0);
    assert!((out.setpoints.air - 0.3).abs() < EPS);
    assert_eq!(out.diagnostics.adapted_center, Some(0.0));
}

#[test]
fn angled_strip_tracks_the_diagonal() {
    let config = SessionConfig {
        strip_angle: 45.0,
        strip_direction: StripDirection::Left,
        periodic_boundary: false,
        ..Default::default()
    };
    let (mut c, mut w, mut ev) = controller(config);
    c.tick(60.0, &at(0.0, 0.0), &mut w, &mut ev).unwrap();

    let out = c.tick(61.0, &at(-20.0, 20.0), &mut w, &mut ev).unwrap();
    assert!(out.diagnostics.instrip);
    let center = out.diagnostics.adapted_center.unwrap();
    assert!((center + 20.0).abs() < 1e-9);
    let thresh = out.diagnostics.strip_thresh.unwrap();
    assert!((thresh - 5.0 * std::f64::consts::SQRT_2).abs() < 1e-9);

    let out = c.tick(62.0, &at(20.0, 20.0), &mut w, &mut ev).unwrap();
    assert!(!out.diagnostics.instrip);
}

#[test]
fn periodic_arena_repeats_the_strip() {
    let (mut c, mut w, mut ev) = controller(SessionConfig::default());
    c.tick(60.0, &at(0.0, 0.0), &mut w, &mut ev).unwrap();
    let out = c.tick(61.0, &at(401.0, 10.0), &mut w, &mut ev).unwrap();
    assert!(out.diagnostics.instrip);

    let open = SessionConfig {
        periodic_boundary: false,
        ..Default::default()
    };
    let (mut c, mut w, mut ev) = controller(open);
    c.tick(60.0, &at(0.0, 0.0), &mut w, &mut ev).unwrap();
    let out = c.tick(61.0, &at(401.0, 10.0), &mut w, &mut ev).unwrap();
    assert!(!out.diagnostics.instrip);
}

#[test]
fn flow_alternates_from_each_onset() {
    let (mut c, mut w, mut ev) = controller(SessionConfig::default());
    c.tick(60.0, &at(0.0, 0.0), &mut w, &mut ev).unwrap();

    let high = c.tick(60.0 + 119.0, &at(0.0, 1.0), &mut w, &mut ev).unwrap();
    assert!((high.setpoints.air + high.setpoints.odor1 - 0.3).abs() < EPS);

    let low = c.tick(60.0 + 121.0, &at(0.0, 2.0), &mut w, &mut ev).unwrap();
    assert!((low.setpoints.air + low.setpoints.odor1 - 0.02).abs() < EPS);
    assert_eq!(c.live().and_then(|s| s.target_flowrate()), Some(20.0));

    let high = c.tick(60.0 + 241.0, &at(0.0, 3.0), &mut w, &mut ev).unwrap();
    assert!((high.setpoints.air + high.setpoints.odor1 - 0.3).abs() < EPS);
}

#[test]
fn edge_resets_and_relatches_at_the_new_position() {
    let config = SessionConfig {
        edge_bound: 50.0,
        ..Default::default()
    };
    let mut tracker = ScriptedTracker::new(vec![
        (0.0, 0.0),   // t=60 onset
        (0.0, 10.0),  // t=61 in strip
        (0.0, 60.0),  // t=62 past the edge
        (5.0, 70.0),  // t=63 new onset
        (5.0, 72.0),  // t=64 in strip of the new episode
    ]);
    let (mut c, mut w, mut ev) = controller(config);

    let mut outs = Vec::new();
    for t in [60.0, 61.0, 62.0, 63.0, 64.0] {
        let reading = tracker.read(t);
        outs.push(c.tick(t, &reading, &mut w, &mut ev).unwrap());
        if t == 62.0 {
            assert_eq!(c.phase(), Some(StateId::PreOnset));
            assert!(c.live().and_then(|s| s.origin()).is_none());
        }
    }

    assert!(outs[1].diagnostics.instrip);
    assert!(!outs[2].diagnostics.instrip);
    assert_eq!(outs[2].setpoints.odor1, 0.0);
    assert_eq!(outs[2].diagnostics.strip_thresh, None);

    let origin = c.live().and_then(|s| s.origin()).unwrap();
    assert_eq!((origin.time, origin.x, origin.y), (63.0, 5.0, 70.0));
    assert!(outs[4].diagnostics.instrip);
    assert_eq!(
        ev.count(|e| matches!(e, AppEvent::OriginLatched { .. })),
        2
    );
}

#[test]
fn led_policy_controls_in_strip_marker() {
    let config = SessionConfig {
        led_policy: InStripLed::AllOff,
        ..Default::default()
    };
    let (mut c, mut w, mut ev) = controller(config);
    let pre = c.tick(0.0, &at(0.0, 0.0), &mut w, &mut ev).unwrap();
    assert_eq!(pre.setpoints.led1, 1.0);

    c.tick(60.0, &at(0.0, 0.0), &mut w, &mut ev).unwrap();
    let inside = c.tick(61.0, &at(0.0, 1.0), &mut w, &mut ev).unwrap();
    assert!(inside.diagnostics.instrip);
    assert_eq!((inside.setpoints.led1, inside.setpoints.led2), (0.0, 0.0));
}

#[test]
fn bad_reading_fails_the_tick_only() {
    let (mut c, mut w, mut ev) = controller(SessionConfig::default());
    c.tick(60.0, &at(0.0, 0.0), &mut w, &mut ev).unwrap();

    let err = c
        .tick(61.0, &at(0.0, f64::INFINITY), &mut w, &mut ev)
        .unwrap_err();
    assert_eq!(err, Error::Reading(ReadingError::NonFinitePosition));

    let out = c.tick(62.0, &at(0.0, 1.0), &mut w, &mut ev).unwrap();
    assert!(out.diagnostics.instrip);
    assert_eq!(c.phase(), Some(StateId::Active));
    assert!(w.waits.is_empty());
}
