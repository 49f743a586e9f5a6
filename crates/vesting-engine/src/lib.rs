//! # vesting-engine
//!
//! Deterministic equity vesting for individual grants.
//!
//! Given a grant (share count, start date, free-text schedule such as
//! `"4 year / 1 year cliff"`) and an explicit reference date, the engine
//! derives how many shares have vested, when the next vesting event falls,
//! and how many shares vest per quarterly event. Nothing reads the system
//! clock: the same inputs always produce the same facts.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use vesting_engine::{compute_vesting, parse_schedule};
//!
//! let schedule = parse_schedule(Some("4 year / 1 year cliff"));
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let now = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
//!
//! let facts = compute_vesting(1_000_000, start, &schedule, now).unwrap();
//! assert_eq!(facts.vested_shares, 500_000);
//! assert_eq!(facts.next_vesting_date, NaiveDate::from_ymd_opt(2027, 4, 1));
//! ```
//!
//! ## Modules
//!
//! - [`schedule`] -- free-text schedule → [`ParsedSchedule`] (total, never fails)
//! - [`calculator`] -- vested/unvested shares, next event date and amount, timeline
//! - [`grant`] -- validated [`Grant`] values and raw [`GrantRecord`] rows
//! - [`report`] -- per-row batch evaluation with fallback and error counts
//! - [`error`] -- Error types

pub mod calculator;
pub mod error;
pub mod grant;
pub mod report;
pub mod schedule;

pub use calculator::{compute_vesting, months_elapsed, vesting_events, VestingEvent, VestingFacts};
pub use error::VestingError;
pub use grant::{parse_date, shares_from_f64, Grant, GrantRecord, MAX_FLOAT_SHARES};
pub use report::{build_report, ReportRow, RowOutcome, VestingReport};
pub use schedule::{
    parse_schedule, parse_schedule_detailed, ParsedSchedule, ScheduleFallback, ScheduleParse,
};
