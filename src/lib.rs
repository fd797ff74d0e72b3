//! StripVR controller library.
//!
//! Closed-loop odor strip control for tethered-walking olfactory rigs, plus
//! an instant-replay engine that plays a session's flow stream back open
//! loop.  Everything here is pure logic behind port traits; the host
//! binary plugs in the clock, tracker and session log.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;
pub mod replay;
