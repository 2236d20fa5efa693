//! Episode aggregation
//!
//! An episode return is the plain sum of its per-step rewards. Discounting
//! and normalization are left to the training loop.
//!
//! The sum is exact up to one final rounding, so the return does not depend
//! on the order the rewards arrive in.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::AuctionOutcome;
use crate::rewards::calculator::{RewardCalculator, RewardError};

/// Sum a sequence of rewards; an empty sequence sums to 0
///
/// The result is the correctly rounded value of the exact sum, so every
/// permutation of the same rewards gives the same total.
///
/// # Example
/// ```
/// use bid_reward_core_rs::aggregate;
///
/// assert_eq!(aggregate(Vec::<f64>::new()), 0.0);
/// assert_eq!(aggregate([1.0, -10.0, 11.0]), 2.0);
/// assert_eq!(aggregate([1e16, 1.0, -1e16]), aggregate([1e16, -1e16, 1.0]));
/// ```
pub fn aggregate<I>(rewards: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let rewards: Vec<f64> = rewards.into_iter().collect();

    // NaN and infinities have no exact sum; plain addition gives the IEEE result
    if rewards.iter().any(|r| !r.is_finite()) {
        return naive_sum(&rewards);
    }

    // Non-overlapping partials, smallest magnitude first
    let mut partials: Vec<f64> = Vec::new();
    for &reward in &rewards {
        let mut x = reward;
        let mut kept = 0;
        for j in 0..partials.len() {
            let mut y = partials[j];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            let lo = y - (hi - x);
            if lo != 0.0 {
                partials[kept] = lo;
                kept += 1;
            }
            x = hi;
        }
        if !x.is_finite() {
            // Intermediate overflow
            return naive_sum(&rewards);
        }
        partials.truncate(kept);
        partials.push(x);
    }

    round_partials(&partials)
}

fn naive_sum(rewards: &[f64]) -> f64 {
    rewards.iter().fold(0.0, |total, reward| total + reward)
}

/// Collapse partials into the correctly rounded total (round half to even)
fn round_partials(partials: &[f64]) -> f64 {
    let mut n = partials.len();
    if n == 0 {
        return 0.0;
    }

    n -= 1;
    let mut hi = partials[n];
    let mut lo = 0.0;
    while n > 0 {
        let x = hi;
        n -= 1;
        let y = partials[n];
        hi = x + y;
        lo = y - (hi - x);
        if lo != 0.0 {
            break;
        }
    }

    // Half-way case: the next partial decides the rounding direction
    if n > 0 && ((lo < 0.0 && partials[n - 1] < 0.0) || (lo > 0.0 && partials[n - 1] > 0.0)) {
        let y = lo * 2.0;
        let x = hi + y;
        if y == x - hi {
            hi = x;
        }
    }

    hi
}

/// Scored episode, ready to be logged or written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Unique episode identifier (UUID)
    pub episode_id: String,

    /// Fingerprint of the policy the rewards were computed under
    pub policy_hash: String,

    /// Number of scored steps
    pub steps: usize,

    /// Per-step rewards in time order
    pub rewards: Vec<f64>,

    /// Episode return
    pub total: f64,
}

/// Collects per-step rewards for one episode
#[derive(Debug, Clone)]
pub struct EpisodeAggregator {
    episode_id: String,
    rewards: Vec<f64>,
}

impl Default for EpisodeAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl EpisodeAggregator {
    /// Start a new episode with a fresh UUID
    pub fn new() -> Self {
        Self {
            episode_id: Uuid::new_v4().to_string(),
            rewards: Vec::new(),
        }
    }

    pub fn episode_id(&self) -> &str {
        &self.episode_id
    }

    /// Record the reward of the next step
    pub fn push(&mut self, reward: f64) {
        self.rewards.push(reward);
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    /// Episode return so far
    pub fn total(&self) -> f64 {
        aggregate(self.rewards.iter().copied())
    }

    /// Close the episode
    pub fn finish(self, policy_hash: impl Into<String>) -> EpisodeSummary {
        let total = self.total();
        EpisodeSummary {
            episode_id: self.episode_id,
            policy_hash: policy_hash.into(),
            steps: self.rewards.len(),
            rewards: self.rewards,
            total,
        }
    }
}

/// Score every outcome of an episode in order and aggregate the rewards
///
/// # Errors
///
/// Stops at the first outcome that cannot be scored and returns
/// `RewardError::Step` with its index.
pub fn score_episode(
    calculator: &RewardCalculator,
    outcomes: &[AuctionOutcome],
    initial_budget: f64,
    verbose: bool,
) -> Result<EpisodeSummary, RewardError> {
    let policy_hash = calculator.policy().config_hash()?;
    let mut episode = EpisodeAggregator::new();

    for (index, outcome) in outcomes.iter().enumerate() {
        let reward = calculator
            .compute(outcome, initial_budget, verbose)
            .map_err(|e| RewardError::Step {
                index,
                source: Box::new(e),
            })?;
        episode.push(reward);
    }

    Ok(episode.finish(policy_hash))
}
