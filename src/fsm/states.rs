//! Concrete state handler functions and table builder.
//!
//! ```text
//!  PRE-ONSET ──[time >= pre_onset_time]──▶ ACTIVE (origin latched)
//!      ▲                                     │
//!      └────────[|y_rel| >= edge_bound]──────┘
//! ```
//!
//! The onset tick itself still emits the pre-air baseline; the strip
//! switches on from the following tick.

use super::context::{Diagnostics, FsmContext, Origin, RunMode, Setpoints};
use super::{StateDescriptor, StateId};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once per live session.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: PreOnset
        StateDescriptor {
            id: StateId::PreOnset,
            name: "PreOnset",
            on_enter: Some(pre_onset_enter),
            on_exit: None,
            on_update: pre_onset_update,
        },
        // Index 1: Active
        StateDescriptor {
            id: StateId::Active,
            name: "Active",
            on_enter: Some(active_enter),
            on_exit: Some(active_exit),
            on_update: active_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  PRE-ONSET: clean air at the static flow rate, marker LED on
// ═══════════════════════════════════════════════════════════════════════════

fn pre_onset_enter(ctx: &mut FsmContext) {
    ctx.origin = None;
    ctx.frame = None;
    ctx.target_flowrate = None;
    info!(
        "PRE-ONSET: clean air at {} mL/min until t={}s",
        ctx.config.flowrate, ctx.config.pre_onset_time
    );
}

fn pre_onset_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.setpoints = Setpoints::baseline(ctx.config.flowrate);
    ctx.diagnostics = Diagnostics::cleared(RunMode::Live);

    if ctx.now >= ctx.config.pre_onset_time {
        return Some(StateId::Active);
    }

    debug!("T={:.1} pre-onset", ctx.now);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE: strip evaluated relative to the latched origin
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut FsmContext) {
    let origin = Origin {
        time: ctx.now,
        x: ctx.reading.posx,
        y: ctx.reading.posy,
    };
    ctx.origin = Some(origin);
    info!(
        "ONSET: origin latched at t={:.2}s x={:.1} y={:.1}",
        origin.time, origin.x, origin.y
    );
}

fn active_exit(ctx: &mut FsmContext) {
    info!(
        "ACTIVE: episode ended after {:.1}s ({} ticks) at y={:.1}",
        ctx.episode_time().unwrap_or_default(),
        ctx.ticks_in_state,
        ctx.frame.map_or(0.0, |f| f.y)
    );
}

fn active_update(ctx: &mut FsmContext) -> Option<StateId> {
    let Some(origin) = ctx.origin else {
        // Entered without an onset tick; start a fresh pre-air episode.
        return Some(StateId::PreOnset);
    };

    let x_rel = ctx.reading.posx - origin.x;
    let y_rel = ctx.reading.posy - origin.y;
    let t_rel = ctx.now - origin.time;

    let frame = ctx.geometry.compute(x_rel, y_rel);
    let target = ctx.schedule.target(t_rel);
    ctx.frame = Some(frame);
    ctx.target_flowrate = Some(target);

    let mut next = None;
    if !frame.in_strip() {
        ctx.setpoints = Setpoints::baseline(target);
        ctx.diagnostics = Diagnostics {
            instrip: false,
            adapted_center: Some(frame.adapted_center),
            strip_thresh: Some(frame.strip_thresh),
            mode: RunMode::Live,
        };
    } else if frame.y.abs() < ctx.config.edge_bound {
        ctx.setpoints =
            Setpoints::in_strip(target, ctx.config.percent_odor, ctx.config.led_policy);
        ctx.diagnostics = Diagnostics {
            instrip: true,
            adapted_center: Some(frame.adapted_center),
            strip_thresh: Some(frame.strip_thresh),
            mode: RunMode::Live,
        };
    } else {
        ctx.setpoints = Setpoints::baseline(target);
        ctx.diagnostics = Diagnostics::cleared(RunMode::Live);
        next = Some(StateId::PreOnset);
    }

    debug!(
        "T={:.1} exp={:.1} x={:.1} y={:.1} odor={} flow={}",
        ctx.now,
        t_rel,
        frame.x,
        frame.y,
        if ctx.diagnostics.instrip { "ON" } else { "OFF" },
        target
    );
    next
}
