//! WASM bindings for vesting-engine.
//!
//! Exposes schedule parsing, vesting computation, timelines and batch reports
//! to JavaScript via `wasm-bindgen`. Complex values cross the boundary as JSON
//! strings; dates are ISO 8601 strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p vesting-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/vesting-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/vesting_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use vesting_engine::GrantRecord;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

// Work is done on `Result<_, String>` and converted to `JsValue` only at the
// export boundary; `JsValue` cannot be built outside a wasm32 target.
type BindingResult<T> = Result<T, String>;

fn to_js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

fn parse_date(s: &str) -> BindingResult<NaiveDate> {
    vesting_engine::parse_date(s).map_err(|e| e.to_string())
}

/// JavaScript numbers are doubles; only whole positive values up to
/// `Number.MAX_SAFE_INTEGER` are share counts.
fn share_count(total_shares: f64) -> BindingResult<u64> {
    vesting_engine::shares_from_f64(total_shares).map_err(|e| e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> BindingResult<String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn compute_vesting_json(
    total_shares: f64,
    start_date: &str,
    schedule: Option<&str>,
    as_of: &str,
) -> BindingResult<String> {
    let shares = share_count(total_shares)?;
    let start = parse_date(start_date)?;
    let now = parse_date(as_of)?;
    let schedule = vesting_engine::parse_schedule(schedule);

    let facts = vesting_engine::compute_vesting(shares, start, &schedule, now)
        .map_err(|e| e.to_string())?;
    to_json(&facts)
}

fn vesting_timeline_json(
    total_shares: f64,
    start_date: &str,
    schedule: Option<&str>,
) -> BindingResult<String> {
    let shares = share_count(total_shares)?;
    let start = parse_date(start_date)?;
    let schedule = vesting_engine::parse_schedule(schedule);

    let events =
        vesting_engine::vesting_events(shares, start, &schedule).map_err(|e| e.to_string())?;
    to_json(&events)
}

fn build_report_json(records_json: &str, as_of: &str) -> BindingResult<String> {
    let records: Vec<GrantRecord> =
        serde_json::from_str(records_json).map_err(|e| format!("Invalid grants JSON: {}", e))?;
    let now = parse_date(as_of)?;

    to_json(&vesting_engine::build_report(&records, now))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Parse free-text schedule text.
///
/// Never throws. Returns a JSON string
/// `{"schedule": {"duration_months", "cliff_months"}, "fallback": string | null}`.
#[wasm_bindgen(js_name = "parseSchedule")]
pub fn parse_schedule(text: Option<String>) -> Result<String, JsValue> {
    to_json(&vesting_engine::parse_schedule_detailed(text.as_deref())).map_err(to_js_error)
}

/// Compute vesting facts for one grant as of `as_of`.
///
/// Returns a JSON string with `vested_shares`, `unvested_shares`,
/// `next_vesting_date` (ISO date or null) and `next_vesting_amount`.
/// Throws on a share count that is not a whole number between 1 and
/// `Number.MAX_SAFE_INTEGER`, or on an invalid date.
#[wasm_bindgen(js_name = "computeVesting")]
pub fn compute_vesting(
    total_shares: f64,
    start_date: &str,
    schedule: Option<String>,
    as_of: &str,
) -> Result<String, JsValue> {
    compute_vesting_json(total_shares, start_date, schedule.as_deref(), as_of)
        .map_err(to_js_error)
}

/// List every vesting event of one grant as a JSON array of
/// `{date, months_from_start, shares, cumulative_shares}` objects.
#[wasm_bindgen(js_name = "vestingTimeline")]
pub fn vesting_timeline(
    total_shares: f64,
    start_date: &str,
    schedule: Option<String>,
) -> Result<String, JsValue> {
    vesting_timeline_json(total_shares, start_date, schedule.as_deref()).map_err(to_js_error)
}

/// Evaluate a JSON array of grant rows (`{holder?, total_shares, start_date, schedule?}`)
/// as of `as_of`. Invalid rows are reported inside the result, not thrown.
#[wasm_bindgen(js_name = "buildReport")]
pub fn build_report(records_json: &str, as_of: &str) -> Result<String, JsValue> {
    build_report_json(records_json, as_of).map_err(to_js_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn share_count_rejects_doubles_past_max_safe_integer() {
        for shares in [1e30, 9_007_199_254_740_992.0, u64::MAX as f64, f64::INFINITY] {
            let err = share_count(shares).unwrap_err();
            assert!(err.starts_with("Invalid argument"), "{shares}: {err}");
        }
        assert_eq!(share_count(9_007_199_254_740_991.0), Ok(9_007_199_254_740_991));
    }

    #[test]
    fn compute_vesting_rejects_huge_share_count() {
        let err = compute_vesting_json(1e30, "2025-01-01", None, "2027-01-01").unwrap_err();
        assert!(err.contains("total_shares"), "got: {err}");
    }

    #[test]
    fn compute_vesting_accepts_whole_double() {
        let json = compute_vesting_json(
            1_000_000.0,
            "2025-01-01",
            Some("4 year / 1 year cliff"),
            "2027-01-01",
        )
        .unwrap();
        let facts: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(facts["vested_shares"], 500_000);
        assert_eq!(facts["next_vesting_date"], "2027-04-01");
    }

    #[test]
    fn timeline_rejects_fractional_share_count() {
        assert!(vesting_timeline_json(12.5, "2025-01-01", None).is_err());
    }

    #[test]
    fn report_counts_rejected_rows() {
        let json = build_report_json(
            r#"[{"total_shares":1e30,"start_date":"2025-01-01","schedule":"4 years"}]"#,
            "2027-01-01",
        )
        .unwrap();
        let report: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(report["error_count"], 1);
    }
}
