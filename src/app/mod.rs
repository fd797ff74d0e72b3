//! Application core: the controller the acquisition loop talks to.
//!
//! This module wires the live state machine and the replay engine behind
//! one per-tick API.  All interaction with trackers, clocks and log files
//! happens through the **port traits** in [`ports`], keeping this layer
//! testable without a rig.

pub mod commands;
pub mod events;
pub mod live;
pub mod ports;
pub mod service;
