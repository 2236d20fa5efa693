//! PyO3 wrappers for reward computation
//!
//! # Example (from Python)
//!
//! ```python
//! from bid_reward_core_rs import calculate_reward, aggregate_rewards
//!
//! step = {
//!     "bid_amount": 12.0,
//!     "cost": 11.0,
//!     "remaining_budget": 870.0,
//!     "rank": 2,
//!     "margin": 1.0,
//!     "win": True,
//!     "bid": True,
//!     "choosen_keyword_available": True,
//!     "other_high_rank_keywords_available": {},
//! }
//!
//! reward = calculate_reward(step, 1000.0, verbose=True)
//! episode_return = aggregate_rewards([reward, -10.0])
//! ```

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{episode_summary_to_py, parse_auction_outcome, reward_error_to_py};
use crate::policy::{
    RewardPolicy, DEFAULT_KEYWORD_BASE_IMPORTANCE, DEFAULT_MAX_BUDGET_CONSUMPTION_PER_AUCTION,
    DEFAULT_STOP_PENALTY_DECAY, DEFAULT_STOP_PENALTY_PERCENT,
};
use crate::rewards::{aggregate, score_episode, RewardCalculator};

/// Score one auction result dict
///
/// Raises ValueError if a required key is missing or the record breaks its
/// contract (NaN fields, a win without a bid, non-positive initial budget).
#[pyfunction]
#[pyo3(signature = (
    variables_dict,
    initial_budget,
    max_budget_consumption_per_auction = DEFAULT_MAX_BUDGET_CONSUMPTION_PER_AUCTION,
    stop_penalty_percent = DEFAULT_STOP_PENALTY_PERCENT,
    stop_penalty_decay = DEFAULT_STOP_PENALTY_DECAY,
    keyword_base_importance = DEFAULT_KEYWORD_BASE_IMPORTANCE,
    verbose = false
))]
pub fn calculate_reward(
    variables_dict: &Bound<'_, PyDict>,
    initial_budget: f64,
    max_budget_consumption_per_auction: f64,
    stop_penalty_percent: f64,
    stop_penalty_decay: f64,
    keyword_base_importance: f64,
    verbose: bool,
) -> PyResult<f64> {
    let outcome = parse_auction_outcome(variables_dict)?;
    let policy = RewardPolicy {
        max_budget_consumption_per_auction,
        stop_penalty_percent,
        stop_penalty_decay,
        keyword_base_importance,
    };

    crate::rewards::compute_reward(&outcome, initial_budget, &policy, verbose)
        .map_err(reward_error_to_py)
}

/// Sum the rewards of an episode
#[pyfunction]
pub fn aggregate_rewards(episode_rewards: Vec<f64>) -> f64 {
    aggregate(episode_rewards)
}

/// Python wrapper holding a validated policy for repeated scoring
#[pyclass(name = "RewardCalculator")]
pub struct PyRewardCalculator {
    inner: RewardCalculator,
}

#[pymethods]
impl PyRewardCalculator {
    #[new]
    #[pyo3(signature = (
        max_budget_consumption_per_auction = DEFAULT_MAX_BUDGET_CONSUMPTION_PER_AUCTION,
        stop_penalty_percent = DEFAULT_STOP_PENALTY_PERCENT,
        stop_penalty_decay = DEFAULT_STOP_PENALTY_DECAY,
        keyword_base_importance = DEFAULT_KEYWORD_BASE_IMPORTANCE
    ))]
    fn new(
        max_budget_consumption_per_auction: f64,
        stop_penalty_percent: f64,
        stop_penalty_decay: f64,
        keyword_base_importance: f64,
    ) -> PyResult<Self> {
        let policy = RewardPolicy {
            max_budget_consumption_per_auction,
            stop_penalty_percent,
            stop_penalty_decay,
            keyword_base_importance,
        };
        let inner = RewardCalculator::new(policy).map_err(reward_error_to_py)?;
        Ok(Self { inner })
    }

    /// Score one auction result dict
    #[pyo3(signature = (variables_dict, initial_budget, verbose = false))]
    fn compute(
        &self,
        variables_dict: &Bound<'_, PyDict>,
        initial_budget: f64,
        verbose: bool,
    ) -> PyResult<f64> {
        let outcome = parse_auction_outcome(variables_dict)?;
        self.inner
            .compute(&outcome, initial_budget, verbose)
            .map_err(reward_error_to_py)
    }

    /// Score a list of auction result dicts and return the episode summary
    #[pyo3(signature = (outcomes, initial_budget, verbose = false))]
    fn score_episode(
        &self,
        py: Python<'_>,
        outcomes: &Bound<'_, PyList>,
        initial_budget: f64,
        verbose: bool,
    ) -> PyResult<Py<PyDict>> {
        let mut parsed = Vec::with_capacity(outcomes.len());
        for item in outcomes.iter() {
            let dict = item.downcast::<PyDict>()?;
            parsed.push(parse_auction_outcome(dict)?);
        }

        let summary = score_episode(&self.inner, &parsed, initial_budget, verbose)
            .map_err(reward_error_to_py)?;
        episode_summary_to_py(py, &summary)
    }

    /// SHA-256 fingerprint of the calculator's policy
    fn policy_hash(&self) -> PyResult<String> {
        self.inner
            .policy()
            .config_hash()
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }
}
