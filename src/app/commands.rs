//! Inbound commands to the controller.
//!
//! Issued by the acquisition loop between ticks, never during one.

use crate::replay::ReplayBuffer;

#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Switch to replay mode and play back `buffer` from its first entry.
    BeginReplay(ReplayBuffer),

    /// Abandon any replay and re-arm a fresh live session in pre-onset.
    ReturnToLive,
}
