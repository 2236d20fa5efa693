//! Type conversion utilities for FFI boundary
//!
//! Converts between the simulator's Python dictionaries and Rust types.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::models::{keyword_weights, AuctionOutcome};
use crate::rewards::{EpisodeSummary, RewardError};

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract a required field from a Python dict with a clear error message.
///
/// # Errors
/// Returns `ValueError` if the field is missing, or the conversion error if
/// the value has the wrong type.
fn extract_required<'py, T>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<T>
where
    T: FromPyObject<'py>,
{
    dict.get_item(key)?
        .ok_or_else(|| PyValueError::new_err(format!("Missing required field '{}'", key)))?
        .extract()
}

/// Extract a field with a default value if missing.
fn extract_with_default<'py, T>(dict: &Bound<'py, PyDict>, key: &str, default: T) -> PyResult<T>
where
    T: FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

/// Read the first key present from a list of accepted spellings.
fn extract_aliased<'py, T>(dict: &Bound<'py, PyDict>, keys: &[&str]) -> PyResult<T>
where
    T: FromPyObject<'py>,
{
    for key in keys {
        if let Some(value) = dict.get_item(*key)? {
            return value.extract();
        }
    }
    Err(PyValueError::new_err(format!(
        "Missing required field '{}'",
        keys.join("' or '")
    )))
}

// ========================================================================
// Parsers
// ========================================================================

/// Convert the simulator's per-auction dict to an `AuctionOutcome`
///
/// Accepts both the simulator keys (`rank`, `win`, `bid`,
/// `choosen_keyword_available`) and the Rust field names.
pub fn parse_auction_outcome(py_outcome: &Bound<'_, PyDict>) -> PyResult<AuctionOutcome> {
    let bid_amount: f64 = extract_required(py_outcome, "bid_amount")?;
    let cost: f64 = extract_required(py_outcome, "cost")?;
    let remaining_budget: f64 = extract_required(py_outcome, "remaining_budget")?;
    let margin: f64 = extract_required(py_outcome, "margin")?;
    let keyword_rank: u32 = extract_aliased(py_outcome, &["rank", "keyword_rank"])?;
    let won: bool = extract_aliased(py_outcome, &["win", "won"])?;
    let bid_placed: bool = extract_aliased(py_outcome, &["bid", "bid_placed"])?;

    let chosen_keyword_available: bool = match py_outcome.get_item("choosen_keyword_available")? {
        Some(value) => value.extract()?,
        None => extract_with_default(py_outcome, "chosen_keyword_available", true)?,
    };

    let mut pairs = Vec::new();
    if let Some(py_others) = py_outcome.get_item("other_high_rank_keywords_available")? {
        let others = py_others.downcast::<PyDict>()?;
        for (keyword, weight) in others.iter() {
            let keyword = keyword.str()?.to_string();
            let weight: f64 = weight.extract()?;
            pairs.push((keyword, weight));
        }
    }
    let other_high_rank_keywords_available =
        keyword_weights(pairs).map_err(|e| PyValueError::new_err(e.to_string()))?;

    Ok(AuctionOutcome {
        bid_amount,
        cost,
        remaining_budget,
        keyword_rank,
        margin,
        won,
        bid_placed,
        chosen_keyword_available,
        other_high_rank_keywords_available,
    })
}

/// Convert an `EpisodeSummary` to a Python dict
pub fn episode_summary_to_py(py: Python<'_>, summary: &EpisodeSummary) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);

    dict.set_item("episode_id", &summary.episode_id)?;
    dict.set_item("policy_hash", &summary.policy_hash)?;
    dict.set_item("steps", summary.steps)?;
    dict.set_item("rewards", summary.rewards.clone())?;
    dict.set_item("total", summary.total)?;

    Ok(dict.unbind())
}

/// Map a scoring error to a Python `ValueError`
pub fn reward_error_to_py(error: RewardError) -> PyErr {
    PyValueError::new_err(error.to_string())
}
