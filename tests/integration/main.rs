//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  Nothing here needs a tracker or real time.

mod controller_tests;
mod recording_tests;
mod replay_tests;
