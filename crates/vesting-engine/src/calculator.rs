//! Vesting arithmetic -- vested shares, next vesting event, and the full timeline.
//!
//! Everything here works at month granularity: the elapsed time between the
//! grant start and the reference date is a whole number of calendar months
//! with the day of month ignored. All three facts (vested amount, next date,
//! next amount) are derived from the same elapsed-month count.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VestingError};
use crate::schedule::ParsedSchedule;

/// After the cliff, shares vest every quarter.
pub const MONTHS_PER_QUARTER: u32 = 3;

/// Vesting state of one grant as of a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingFacts {
    /// Shares earned so far. Never exceeds the grant's total.
    pub vested_shares: u64,
    /// `total_shares - vested_shares`.
    pub unvested_shares: u64,
    /// Date of the next vesting event, `None` once fully vested.
    pub next_vesting_date: Option<NaiveDate>,
    /// Steady-state per-quarter increment for this schedule.
    pub next_vesting_amount: u64,
}

impl VestingFacts {
    pub fn is_fully_vested(&self) -> bool {
        self.unvested_shares == 0
    }
}

/// One vesting event on a grant's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingEvent {
    pub date: NaiveDate,
    pub months_from_start: u32,
    /// Shares that vest at this event.
    pub shares: u64,
    /// Shares vested once this event has happened.
    pub cumulative_shares: u64,
}

/// Calendar months between `start` and `now`, ignoring the day of month.
///
/// Negative when `now` falls in an earlier month than `start`.
pub fn months_elapsed(start: NaiveDate, now: NaiveDate) -> i64 {
    let years = i64::from(now.year()) - i64::from(start.year());
    let months = i64::from(now.month()) - i64::from(start.month());
    years * 12 + months
}

/// Compute vested shares and the next vesting event for a grant as of `now`.
///
/// - Before the cliff nothing is vested.
/// - From the cliff on, `floor(total * min(1, elapsed / duration))` is vested.
///   Truncation never credits a fractional share; the remainder carries into
///   later events.
/// - The next event is the grant start if it has not begun, the cliff date
///   while inside the cliff, otherwise the next quarter boundary measured from
///   the start. Fully vested grants have no next event.
/// - The next amount is `floor(total / quarters)` over the whole duration and
///   does not depend on `now`.
///
/// # Errors
/// Returns `VestingError::InvalidArgument` if `total_shares` is zero.
/// Returns `VestingError::DateOutOfRange` if the next event date cannot be
/// represented.
pub fn compute_vesting(
    total_shares: u64,
    start_date: NaiveDate,
    schedule: &ParsedSchedule,
    now: NaiveDate,
) -> Result<VestingFacts> {
    ensure_positive(total_shares)?;

    let elapsed = months_elapsed(start_date, now);
    let vested_shares = vested_at(total_shares, schedule, elapsed);
    let next_vesting_date = next_vesting_date(start_date, schedule, elapsed, now)?;
    let next_vesting_amount = quarterly_amount(total_shares, schedule);

    debug!(
        total_shares,
        %start_date,
        %now,
        months_elapsed = elapsed,
        vested_shares,
        "computed vesting"
    );

    Ok(VestingFacts {
        vested_shares,
        unvested_shares: total_shares - vested_shares,
        next_vesting_date,
        next_vesting_amount,
    })
}

/// List every vesting event of a grant, from the cliff to full vesting.
///
/// Events fall on the cliff (when there is one), on each quarter boundary
/// after it, and on the final month of the duration, in ascending order.
/// Each event's amount is the difference in vested shares from the previous
/// event, using the same rule as [`compute_vesting`], so the last event's
/// `cumulative_shares` equals `total_shares`. Quarters where truncation leaves
/// nothing new are skipped.
///
/// # Errors
/// Returns `VestingError::InvalidArgument` if `total_shares` is zero.
/// Returns `VestingError::DateOutOfRange` if the final event date cannot be
/// represented; this is checked before any event is built.
pub fn vesting_events(
    total_shares: u64,
    start_date: NaiveDate,
    schedule: &ParsedSchedule,
) -> Result<Vec<VestingEvent>> {
    ensure_positive(total_shares)?;

    let duration = schedule.duration_months();
    let cliff = schedule.cliff_months();

    // Every event falls on or before the last one, so one range check here
    // covers the whole timeline.
    add_months(start_date, u64::from(duration))?;

    let quarter = MONTHS_PER_QUARTER;
    let first_quarter_after_cliff = (cliff / quarter + 1) * quarter;
    let offsets = (cliff > 0)
        .then_some(cliff)
        .into_iter()
        .chain((first_quarter_after_cliff..duration).step_by(quarter as usize))
        .chain(std::iter::once(duration));

    let mut events = Vec::new();
    let mut previous = 0;

    for months in offsets {
        let cumulative = vested_at(total_shares, schedule, i64::from(months));
        if cumulative == previous {
            continue;
        }
        events.push(VestingEvent {
            date: add_months(start_date, u64::from(months))?,
            months_from_start: months,
            shares: cumulative - previous,
            cumulative_shares: cumulative,
        });
        previous = cumulative;
    }

    Ok(events)
}

fn ensure_positive(total_shares: u64) -> Result<()> {
    if total_shares == 0 {
        return Err(VestingError::InvalidArgument(
            "total_shares must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

fn vested_at(total_shares: u64, schedule: &ParsedSchedule, elapsed: i64) -> u64 {
    if elapsed < i64::from(schedule.cliff_months()) {
        return 0;
    }

    // elapsed >= cliff >= 0 from here on.
    let elapsed = elapsed.unsigned_abs();
    let duration = u64::from(schedule.duration_months());
    if elapsed >= duration {
        return total_shares;
    }

    let vested = u128::from(total_shares) * u128::from(elapsed) / u128::from(duration);
    // elapsed < duration, so vested < total_shares.
    vested as u64
}

fn next_vesting_date(
    start_date: NaiveDate,
    schedule: &ParsedSchedule,
    elapsed: i64,
    now: NaiveDate,
) -> Result<Option<NaiveDate>> {
    if start_date > now {
        return Ok(Some(start_date));
    }
    if elapsed < i64::from(schedule.cliff_months()) {
        return add_months(start_date, u64::from(schedule.cliff_months())).map(Some);
    }
    if elapsed >= i64::from(schedule.duration_months()) {
        return Ok(None);
    }

    let quarter = u64::from(MONTHS_PER_QUARTER);
    let quarters_passed = elapsed.unsigned_abs() / quarter;
    add_months(start_date, (quarters_passed + 1) * quarter).map(Some)
}

fn quarterly_amount(total_shares: u64, schedule: &ParsedSchedule) -> u64 {
    let quarters_total = schedule.duration_months() / MONTHS_PER_QUARTER;
    if quarters_total == 0 {
        return 0;
    }
    total_shares / u64::from(quarters_total)
}

/// `start + months`, clamping the day to the end of a shorter target month.
fn add_months(start: NaiveDate, months: u64) -> Result<NaiveDate> {
    u32::try_from(months)
        .ok()
        .and_then(|m| start.checked_add_months(Months::new(m)))
        .ok_or_else(|| {
            VestingError::DateOutOfRange(format!("{} plus {} months", start, months))
        })
}
