//! Schedule parsing -- converts free-text vesting schedules into month counts.
//!
//! Schedule text comes from loosely structured data entry (spreadsheets, CSV
//! exports, hand-edited JSON), so parsing is total: malformed text degrades to
//! the default 4 year / 1 year cliff schedule and the degradation is reported
//! through `tracing` and [`ScheduleParse::fallback`] instead of an error.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, VestingError};

/// Duration used when the schedule text is missing or its duration is unparsable.
pub const DEFAULT_DURATION_MONTHS: u32 = 48;

/// Cliff used when the schedule text has no cliff segment or it is unparsable.
pub const DEFAULT_CLIFF_MONTHS: u32 = 12;

const MONTHS_PER_YEAR: u32 = 12;

/// A normalized vesting schedule: total duration and cliff, both in months.
///
/// Invariant: `duration_months > 0` and `cliff_months <= duration_months`.
/// The fields are private so every value in circulation has passed either
/// the lenient parser or [`ParsedSchedule::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule")]
pub struct ParsedSchedule {
    duration_months: u32,
    cliff_months: u32,
}

#[derive(Deserialize)]
struct RawSchedule {
    duration_months: u32,
    cliff_months: u32,
}

impl TryFrom<RawSchedule> for ParsedSchedule {
    type Error = VestingError;

    fn try_from(raw: RawSchedule) -> Result<Self> {
        Self::new(raw.duration_months, raw.cliff_months)
    }
}

impl ParsedSchedule {
    /// Build a schedule from explicit month counts.
    ///
    /// # Errors
    /// Returns `VestingError::InvalidSchedule` if the duration is zero or the
    /// cliff is longer than the duration.
    pub fn new(duration_months: u32, cliff_months: u32) -> Result<Self> {
        if duration_months == 0 {
            return Err(VestingError::InvalidSchedule(
                "duration must be at least one month".to_string(),
            ));
        }
        if cliff_months > duration_months {
            return Err(VestingError::InvalidSchedule(format!(
                "cliff of {} months exceeds duration of {} months",
                cliff_months, duration_months
            )));
        }
        Ok(Self {
            duration_months,
            cliff_months,
        })
    }

    pub fn duration_months(&self) -> u32 {
        self.duration_months
    }

    pub fn cliff_months(&self) -> u32 {
        self.cliff_months
    }
}

impl Default for ParsedSchedule {
    /// 4 years with a 1 year cliff.
    fn default() -> Self {
        Self {
            duration_months: DEFAULT_DURATION_MONTHS,
            cliff_months: DEFAULT_CLIFF_MONTHS,
        }
    }
}

impl fmt::Display for ParsedSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} cliff",
            span(self.duration_months),
            span(self.cliff_months)
        )
    }
}

/// Render a month count as whole years when possible.
fn span(months: u32) -> String {
    if months % MONTHS_PER_YEAR == 0 {
        let years = months / MONTHS_PER_YEAR;
        if years == 1 {
            "1 year".to_string()
        } else {
            format!("{} years", years)
        }
    } else if months == 1 {
        "1 month".to_string()
    } else {
        format!("{} months", months)
    }
}

impl FromStr for ParsedSchedule {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(parse_schedule(Some(s)))
    }
}

/// Why the parser substituted a default for part of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleFallback {
    /// No schedule text at all (absent, empty or whitespace).
    Missing,
    /// The duration segment had no `<N> year` pattern, or `N` was zero.
    UnparsableDuration,
    /// A cliff segment was present but had no `<M> year` pattern.
    UnparsableCliff,
    /// The cliff was longer than the duration and was shortened to match it.
    CliffClamped,
}

impl fmt::Display for ScheduleFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ScheduleFallback::Missing => "schedule text missing",
            ScheduleFallback::UnparsableDuration => "duration not parsable",
            ScheduleFallback::UnparsableCliff => "cliff not parsable",
            ScheduleFallback::CliffClamped => "cliff clamped to duration",
        };
        f.write_str(msg)
    }
}

/// A parsed schedule together with the first fallback applied, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleParse {
    pub schedule: ParsedSchedule,
    pub fallback: Option<ScheduleFallback>,
}

impl ScheduleParse {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Parse schedule text such as `"4 year / 1 year cliff"` into month counts.
///
/// Never fails; see [`parse_schedule_detailed`] for the fallback rules.
pub fn parse_schedule(text: Option<&str>) -> ParsedSchedule {
    parse_schedule_detailed(text).schedule
}

/// Parse schedule text and report which defaults, if any, were substituted.
///
/// The text is split on the first `/`. In each segment the first integer that
/// is followed (after optional whitespace) by `year` is taken as a year count,
/// case-insensitively. The left segment gives the duration, the right segment
/// the cliff.
///
/// - Absent or blank text yields the default 48/12 schedule.
/// - An unparsable (or zero-year) duration falls back to 48 months.
/// - A missing cliff segment means a 12 month cliff; an unparsable one also
///   falls back to 12 months.
/// - A cliff longer than the duration is clamped to the duration.
///
/// Every fallback is logged at `warn` level.
pub fn parse_schedule_detailed(text: Option<&str>) -> ScheduleParse {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        warn!(
            "vesting schedule missing, using default {}",
            ParsedSchedule::default()
        );
        return ScheduleParse {
            schedule: ParsedSchedule::default(),
            fallback: Some(ScheduleFallback::Missing),
        };
    };

    let (duration_part, cliff_part) = match text.split_once('/') {
        Some((duration, cliff)) => (duration, Some(cliff)),
        None => (text, None),
    };

    let mut fallback = None;

    let duration_months = match segment_months(duration_part).filter(|&m| m > 0) {
        Some(months) => months,
        None => {
            warn!(
                schedule = text,
                "unparsable vesting duration, defaulting to {} months", DEFAULT_DURATION_MONTHS
            );
            fallback = fallback.or(Some(ScheduleFallback::UnparsableDuration));
            DEFAULT_DURATION_MONTHS
        }
    };

    let cliff_months = match cliff_part {
        None => DEFAULT_CLIFF_MONTHS,
        Some(part) => match segment_months(part) {
            Some(months) => months,
            None => {
                warn!(
                    schedule = text,
                    "unparsable vesting cliff, defaulting to {} months", DEFAULT_CLIFF_MONTHS
                );
                fallback = fallback.or(Some(ScheduleFallback::UnparsableCliff));
                DEFAULT_CLIFF_MONTHS
            }
        },
    };

    let cliff_months = if cliff_months > duration_months {
        warn!(
            schedule = text,
            cliff_months, duration_months, "vesting cliff exceeds duration, clamping"
        );
        fallback = fallback.or(Some(ScheduleFallback::CliffClamped));
        duration_months
    } else {
        cliff_months
    };

    ScheduleParse {
        schedule: ParsedSchedule {
            duration_months,
            cliff_months,
        },
        fallback,
    }
}

/// Year count of a segment converted to months, if the segment has one.
fn segment_months(segment: &str) -> Option<u32> {
    year_count(segment)?.checked_mul(MONTHS_PER_YEAR)
}

/// Integer immediately followed (modulo whitespace) by `year`, any case.
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+)\s*year").unwrap());

/// Year count of the first integer-year pair in a segment.
fn year_count(segment: &str) -> Option<u32> {
    YEAR_RE.captures(segment)?.get(1)?.as_str().parse().ok()
}
