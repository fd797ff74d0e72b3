//! Pure per-tick math: strip geometry and the flow-rate schedule.
//!
//! Neither module holds session state; both are built once from the
//! validated [`SessionConfig`](crate::config::SessionConfig) and evaluated
//! every active tick by the FSM.

pub mod flowrate;
pub mod strip;
