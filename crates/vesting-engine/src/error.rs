//! Error types for vesting-engine operations.

use thiserror::Error;

/// Errors raised for structural (non free-text) inputs.
///
/// Free-text schedule parsing never produces one of these; it degrades to the
/// default schedule instead (see [`crate::schedule::parse_schedule`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VestingError {
    /// A caller-supplied argument is missing or out of its domain
    /// (zero shares, unparseable start date, non-integer share count).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A schedule built programmatically violates `0 <= cliff <= duration`
    /// or has a zero-month duration.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Month arithmetic ran past the range chrono can represent.
    #[error("Date out of range: {0}")]
    DateOutOfRange(String),
}

pub type Result<T> = std::result::Result<T, VestingError>;
