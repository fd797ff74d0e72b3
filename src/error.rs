//! Unified error types for the strip controller.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! acquisition loop handles tick failures uniformly.  Replay exhaustion and
//! late ticks are *not* errors: the former is a mode transition, the latter
//! is absorbed by the replay catch-up drain.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Static session configuration is invalid.  Raised once, at construction.
    Config(ConfigError),
    /// A per-tick reading could not be used.
    Reading(ReadingError),
    /// A pending replay wait was cancelled by the caller.
    Interrupted,
    /// A replay source or tick log could not be read or written.
    Source(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Reading(e) => write!(f, "reading: {e}"),
            Self::Interrupted => write!(f, "replay wait interrupted"),
            Self::Source(msg) => write!(f, "source: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `strip_angle` is 90 degrees (or an odd multiple), where the strip
    /// threshold divides by zero.
    DegenerateAngle,
    /// `strip_width` is zero or negative.
    NonPositiveWidth,
    /// `period_width` is zero or negative while `periodic_boundary` is on.
    NonPositivePeriod,
    /// `alternation_time` is present but zero or negative.
    NonPositiveAlternation,
    /// `percent_odor` lies outside 0..=100.
    PercentOutOfRange,
    /// One of the flow rates is negative.
    NegativeFlowrate,
    /// `pre_onset_time` is negative.
    NegativeTime,
    /// A numeric field is NaN or infinite.
    NonFinite(&'static str),
    /// The config file could not be read.
    Unreadable(String),
    /// The config file could not be parsed.
    Malformed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateAngle => write!(f, "strip_angle must not be 90 degrees"),
            Self::NonPositiveWidth => write!(f, "strip_width must be positive"),
            Self::NonPositivePeriod => {
                write!(f, "period_width must be positive with periodic_boundary")
            }
            Self::NonPositiveAlternation => write!(f, "alternation_time must be positive"),
            Self::PercentOutOfRange => write!(f, "percent_odor must be within 0..=100"),
            Self::NegativeFlowrate => write!(f, "flow rates must not be negative"),
            Self::NegativeTime => write!(f, "pre_onset_time must not be negative"),
            Self::NonFinite(field) => write!(f, "{field} must be finite"),
            Self::Unreadable(msg) => write!(f, "unreadable config: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed config: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Reading errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingError {
    /// The tick time is NaN or infinite.
    NonFiniteTime,
    /// `posx` or `posy` is NaN or infinite.
    NonFinitePosition,
}

impl fmt::Display for ReadingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteTime => write!(f, "non-finite tick time"),
            Self::NonFinitePosition => write!(f, "non-finite position"),
        }
    }
}

impl From<ReadingError> for Error {
    fn from(e: ReadingError) -> Self {
        Self::Reading(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
