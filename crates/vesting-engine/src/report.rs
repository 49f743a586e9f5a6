//! Batch evaluation of grant rows.
//!
//! Rows are evaluated independently against one reference date. A row with
//! invalid structural data is reported with its error and never counted as
//! zero; a row whose schedule text needed defaults is still evaluated and
//! flagged so callers can surface it as a warning.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::calculator::VestingFacts;
use crate::grant::GrantRecord;
use crate::schedule::{ParsedSchedule, ScheduleFallback};

/// Result of evaluating one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOutcome {
    Facts(VestingFacts),
    Error(String),
}

/// One evaluated input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// Zero-based position of the row in the input.
    pub index: usize,
    pub holder: Option<String>,
    /// The schedule used, absent when the row failed validation.
    pub schedule: Option<ParsedSchedule>,
    /// Set whenever the schedule text needed defaults, even on rejected rows.
    pub schedule_fallback: Option<ScheduleFallback>,
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

impl ReportRow {
    pub fn facts(&self) -> Option<&VestingFacts> {
        match &self.outcome {
            RowOutcome::Facts(facts) => Some(facts),
            RowOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RowOutcome::Facts(_) => None,
            RowOutcome::Error(message) => Some(message),
        }
    }
}

/// Vesting facts for a batch of grants as of one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VestingReport {
    pub as_of: NaiveDate,
    pub rows: Vec<ReportRow>,
    /// Rows whose schedule text fell back to defaults, rejected rows included.
    pub fallback_count: usize,
    /// Rows rejected for invalid share counts or dates.
    pub error_count: usize,
    /// Sum of vested shares over successful rows.
    pub total_vested: u64,
    /// Sum of unvested shares over successful rows.
    pub total_unvested: u64,
}

impl VestingReport {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

/// Evaluate every record against `as_of`.
///
/// A failing row does not stop the batch; it is reported with its error
/// message and excluded from the totals. Its schedule fallback still counts.
pub fn build_report(records: &[GrantRecord], as_of: NaiveDate) -> VestingReport {
    let rows: Vec<ReportRow> = records
        .iter()
        .enumerate()
        .map(|(index, record)| evaluate_row(index, record, as_of))
        .collect();

    let facts = || rows.iter().filter_map(ReportRow::facts);
    let report = VestingReport {
        as_of,
        fallback_count: rows.iter().filter(|r| r.schedule_fallback.is_some()).count(),
        error_count: rows.iter().filter(|r| r.error().is_some()).count(),
        total_vested: facts().fold(0u64, |sum, f| sum.saturating_add(f.vested_shares)),
        total_unvested: facts().fold(0u64, |sum, f| sum.saturating_add(f.unvested_shares)),
        rows,
    };

    debug!(
        rows = report.rows.len(),
        fallback_count = report.fallback_count,
        error_count = report.error_count,
        "built vesting report"
    );

    report
}

fn evaluate_row(index: usize, record: &GrantRecord, as_of: NaiveDate) -> ReportRow {
    let parsed = record.parse_schedule();
    let evaluated = record
        .grant_with(parsed.schedule)
        .and_then(|grant| grant.vesting_as_of(as_of));

    match evaluated {
        Ok(facts) => ReportRow {
            index,
            holder: record.holder.clone(),
            schedule: Some(parsed.schedule),
            schedule_fallback: parsed.fallback,
            outcome: RowOutcome::Facts(facts),
        },
        Err(e) => {
            warn!(index, holder = record.holder.as_deref(), error = %e, "rejected grant row");
            ReportRow {
                index,
                holder: record.holder.clone(),
                schedule: None,
                schedule_fallback: parsed.fallback,
                outcome: RowOutcome::Error(e.to_string()),
            }
        }
    }
}
