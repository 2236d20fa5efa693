//! Keyword Bidding Reward Core - Rust Engine
//!
//! Deterministic reward shaping for a reinforcement-learning agent bidding on
//! keyword auctions under a budget.
//!
//! # Architecture
//!
//! - **models**: Domain types (AuctionOutcome, reward trace events)
//! - **policy**: Reward policy configuration and penalty rules
//! - **rewards**: Per-step reward calculator and episode aggregation
//! - **ffi**: Python bindings (feature `pyo3`)
//!
//! # Critical Invariants
//!
//! 1. Rewards are pure functions of (outcome, policy, initial budget)
//! 2. No hidden state and no randomness in scoring
//! 3. Malformed input fails fast with a typed error

// Module declarations
pub mod models;
pub mod policy;
pub mod rewards;

// Re-exports for convenience
pub use models::{AuctionOutcome, OutcomeError, RewardBranch, RewardEvent, RewardTrace};
pub use policy::{PenaltyRule, PolicyError, RewardPolicy};
pub use rewards::{
    aggregate, compute_reward, score_episode, EpisodeAggregator, EpisodeSummary, RewardBreakdown,
    RewardCalculator, RewardError,
};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn bid_reward_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ffi::rewards::calculate_reward, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::rewards::aggregate_rewards, m)?)?;
    m.add_class::<ffi::rewards::PyRewardCalculator>()?;
    Ok(())
}
