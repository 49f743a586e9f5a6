//! Grant values and raw grant records.
//!
//! A [`GrantRecord`] is one untrusted input row as it arrives from JSON. It is
//! turned into a validated [`Grant`] with [`GrantRecord::into_grant`]: the
//! structural fields (share count, start date) must be valid or the row is
//! rejected, while the free-text schedule goes through the lenient parser.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::calculator::{self, VestingEvent, VestingFacts};
use crate::error::{Result, VestingError};
use crate::schedule::{self, ParsedSchedule, ScheduleFallback, ScheduleParse};

/// One equity award subject to time-based vesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    holder: Option<String>,
    total_shares: u64,
    start_date: NaiveDate,
    schedule: ParsedSchedule,
}

impl Grant {
    /// # Errors
    /// Returns `VestingError::InvalidArgument` if `total_shares` is zero.
    pub fn new(total_shares: u64, start_date: NaiveDate, schedule: ParsedSchedule) -> Result<Self> {
        if total_shares == 0 {
            return Err(VestingError::InvalidArgument(
                "total_shares must be a positive integer".to_string(),
            ));
        }
        Ok(Self {
            holder: None,
            total_shares,
            start_date,
            schedule,
        })
    }

    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = Some(holder.into());
        self
    }

    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }

    pub fn total_shares(&self) -> u64 {
        self.total_shares
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn schedule(&self) -> &ParsedSchedule {
        &self.schedule
    }

    /// Vesting facts for this grant as of `now`. See [`calculator::compute_vesting`].
    pub fn vesting_as_of(&self, now: NaiveDate) -> Result<VestingFacts> {
        calculator::compute_vesting(self.total_shares, self.start_date, &self.schedule, now)
    }

    /// Every vesting event of this grant. See [`calculator::vesting_events`].
    pub fn timeline(&self) -> Result<Vec<VestingEvent>> {
        calculator::vesting_events(self.total_shares, self.start_date, &self.schedule)
    }
}

/// A raw grant row, before validation.
///
/// Field names are snake_case; camelCase aliases are accepted for rows
/// produced by JavaScript tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrantRecord {
    pub holder: Option<String>,
    #[serde(alias = "totalShares")]
    pub total_shares: Option<Number>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    pub schedule: Option<String>,
}

impl GrantRecord {
    /// Validate the structural fields and parse the schedule text.
    ///
    /// Returns the grant and the schedule fallback applied, if any.
    ///
    /// # Errors
    /// Returns `VestingError::InvalidArgument` if `total_shares` is missing,
    /// fractional or not positive, or if `start_date` is missing or not a date.
    pub fn into_grant(self) -> Result<(Grant, Option<ScheduleFallback>)> {
        self.to_grant()
    }

    /// Borrowing form of [`GrantRecord::into_grant`].
    pub fn to_grant(&self) -> Result<(Grant, Option<ScheduleFallback>)> {
        let parsed = self.parse_schedule();
        let grant = self.grant_with(parsed.schedule)?;
        Ok((grant, parsed.fallback))
    }

    /// Run the row's schedule text through the lenient parser.
    pub fn parse_schedule(&self) -> ScheduleParse {
        schedule::parse_schedule_detailed(self.schedule.as_deref())
    }

    /// Validate the structural fields and build a grant on `schedule`.
    ///
    /// # Errors
    /// Same as [`GrantRecord::into_grant`].
    pub fn grant_with(&self, schedule: ParsedSchedule) -> Result<Grant> {
        let total_shares = share_count(self.total_shares.as_ref())?;
        let start_date = match self.start_date.as_deref() {
            Some(raw) => parse_date(raw)?,
            None => {
                return Err(VestingError::InvalidArgument(
                    "start_date is missing".to_string(),
                ))
            }
        };

        let mut grant = Grant::new(total_shares, start_date, schedule)?;
        grant.holder = self.holder.clone();
        Ok(grant)
    }
}

/// Largest share count a float carries exactly (2^53 - 1, JavaScript's
/// `Number.MAX_SAFE_INTEGER`).
pub const MAX_FLOAT_SHARES: f64 = 9_007_199_254_740_991.0;

/// Convert a floating-point share count, as JSON and JavaScript carry it.
///
/// Only whole positive values up to [`MAX_FLOAT_SHARES`] are accepted; larger
/// floats no longer identify a single integer.
///
/// # Errors
/// Returns `VestingError::InvalidArgument` for NaN, infinities, fractional,
/// non-positive or too large values.
pub fn shares_from_f64(value: f64) -> Result<u64> {
    if value.is_finite() && value.fract() == 0.0 && value > 0.0 && value <= MAX_FLOAT_SHARES {
        return Ok(value as u64);
    }
    Err(VestingError::InvalidArgument(format!(
        "total_shares must be a positive integer no greater than {}, got {}",
        MAX_FLOAT_SHARES as u64, value
    )))
}

fn share_count(value: Option<&Number>) -> Result<u64> {
    let number = value
        .ok_or_else(|| VestingError::InvalidArgument("total_shares is missing".to_string()))?;

    if let Some(n) = number.as_u64() {
        return if n > 0 {
            Ok(n)
        } else {
            Err(VestingError::InvalidArgument(format!(
                "total_shares must be a positive integer, got {}",
                number
            )))
        };
    }

    // Whole-valued floats such as `1000.0` are accepted; anything else is not.
    match number.as_f64() {
        Some(f) => shares_from_f64(f),
        None => Err(VestingError::InvalidArgument(format!(
            "total_shares must be a positive integer, got {}",
            number
        ))),
    }
}

/// Parse a calendar date.
///
/// Accepts `YYYY-MM-DD`, an RFC 3339 datetime (the date in its own offset is
/// used), or a naive `YYYY-MM-DDTHH:MM:SS` datetime.
///
/// # Errors
/// Returns `VestingError::InvalidArgument` if the string is none of these.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.date())
        .map_err(|e| VestingError::InvalidArgument(format!("invalid date '{}': {}", s, e)))
}
