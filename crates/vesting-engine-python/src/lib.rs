//! # vesting-engine-python
//!
//! Python bindings for vesting-engine, built with PyO3.
//!
//! Exposes the following functions to Python as the `vesting_engine._native` module:
//!
//! - `parse_schedule(text=None)` -- schedule text -> JSON string
//! - `compute_vesting(total_shares, start_date, as_of, schedule=None)` -- vesting facts JSON
//! - `vesting_timeline(total_shares, start_date, schedule=None)` -- vesting events JSON
//! - `build_report(records_json, as_of)` -- batch report JSON

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyInt};

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Accept a Python int, or a whole float up to 2**53 - 1, as a share count.
///
/// Every rejection is a `ValueError`, including ints past `u64` and negative
/// ints that PyO3 would otherwise report as `OverflowError`.
fn share_count(total_shares: &Bound<'_, PyAny>) -> PyResult<u64> {
    let invalid = || {
        PyValueError::new_err(format!(
            "Invalid argument: total_shares must be a positive integer, got {}",
            total_shares
        ))
    };

    if total_shares.is_instance_of::<PyBool>() {
        return Err(invalid());
    }
    if total_shares.is_instance_of::<PyInt>() {
        return match total_shares.extract::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(invalid()),
        };
    }
    match total_shares.extract::<f64>() {
        Ok(f) => vesting_engine::shares_from_f64(f).map_err(value_error),
        Err(_) => Err(invalid()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value)
        .map_err(|e| PyValueError::new_err(format!("Serialization error: {}", e)))
}

/// Parse free-text vesting schedule text.
///
/// Args:
///     text: Schedule text such as "4 year / 1 year cliff", or None.
///
/// Returns:
///     A JSON string `{"schedule": {"duration_months", "cliff_months"}, "fallback"}`.
///     Never raises for malformed text; `fallback` names the default applied.
#[pyfunction]
#[pyo3(signature = (text=None))]
fn parse_schedule(text: Option<&str>) -> PyResult<String> {
    to_json(&vesting_engine::parse_schedule_detailed(text))
}

/// Compute vesting facts for one grant.
///
/// Args:
///     total_shares: Positive share count (int, or a whole float up to 2**53 - 1).
///     start_date: Grant start date ("YYYY-MM-DD").
///     as_of: Reference date ("YYYY-MM-DD").
///     schedule: Optional schedule text (default 4 year / 1 year cliff).
///
/// Returns:
///     A JSON string with `vested_shares`, `unvested_shares`,
///     `next_vesting_date` and `next_vesting_amount`.
///
/// Raises:
///     ValueError: If `total_shares` is not a positive whole number or a
///         date is invalid.
#[pyfunction]
#[pyo3(signature = (total_shares, start_date, as_of, schedule=None))]
fn compute_vesting(
    total_shares: &Bound<'_, PyAny>,
    start_date: &str,
    as_of: &str,
    schedule: Option<&str>,
) -> PyResult<String> {
    let total_shares = share_count(total_shares)?;
    let start = vesting_engine::parse_date(start_date).map_err(value_error)?;
    let now = vesting_engine::parse_date(as_of).map_err(value_error)?;
    let schedule = vesting_engine::parse_schedule(schedule);

    let facts =
        vesting_engine::compute_vesting(total_shares, start, &schedule, now).map_err(value_error)?;
    to_json(&facts)
}

/// List every vesting event of one grant.
///
/// Returns:
///     A JSON string containing an array of
///     `{date, months_from_start, shares, cumulative_shares}` objects.
///
/// Raises:
///     ValueError: If `total_shares` is not a positive whole number or the
///         date is invalid.
#[pyfunction]
#[pyo3(signature = (total_shares, start_date, schedule=None))]
fn vesting_timeline(
    total_shares: &Bound<'_, PyAny>,
    start_date: &str,
    schedule: Option<&str>,
) -> PyResult<String> {
    let total_shares = share_count(total_shares)?;
    let start = vesting_engine::parse_date(start_date).map_err(value_error)?;
    let schedule = vesting_engine::parse_schedule(schedule);

    let events =
        vesting_engine::vesting_events(total_shares, start, &schedule).map_err(value_error)?;
    to_json(&events)
}

/// Evaluate a batch of grant rows.
///
/// Args:
///     records_json: JSON array of `{holder, total_shares, start_date, schedule}` objects.
///     as_of: Reference date ("YYYY-MM-DD").
///
/// Returns:
///     A JSON string with `rows`, `fallback_count`, `error_count` and totals.
///     Invalid rows are reported inside `rows`, not raised.
///
/// Raises:
///     ValueError: If the JSON input is malformed or `as_of` is invalid.
#[pyfunction]
fn build_report(records_json: &str, as_of: &str) -> PyResult<String> {
    let records: Vec<vesting_engine::GrantRecord> = serde_json::from_str(records_json)
        .map_err(|e| PyValueError::new_err(format!("Invalid grants JSON: {}", e)))?;
    let now = vesting_engine::parse_date(as_of).map_err(value_error)?;

    to_json(&vesting_engine::build_report(&records, now))
}

/// The native extension module, exposed as `vesting_engine._native`.
#[pymodule]
fn _native(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(parse_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(compute_vesting, m)?)?;
    m.add_function(wrap_pyfunction!(vesting_timeline, m)?)?;
    m.add_function(wrap_pyfunction!(build_report, m)?)?;
    Ok(())
}
