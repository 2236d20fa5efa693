//! Reward Policy Module
//!
//! This module defines the tuning parameters of the reward function and the
//! penalty rules applied to won auctions.
//!
//! # Overview
//!
//! A `RewardPolicy` is built once per run (from defaults, a JSON file or
//! command-line flags) and stays immutable for the episode. It controls:
//! - How much of the pre-auction budget a single bid may consume
//! - When late-episode leniency kicks in, and how strong it is
//! - The base importance of keywords
//!
//! # Example
//!
//! ```rust
//! use bid_reward_core_rs::RewardPolicy;
//!
//! let policy = RewardPolicy::from_json_str(r#"{ "stop_penalty_decay": 0.5 }"#).unwrap();
//!
//! assert_eq!(policy.max_budget_consumption_per_auction, 0.5);
//! assert_eq!(policy.stop_penalty_decay, 0.5);
//! assert_eq!(policy.keyword_importance(0), 10.0);
//! assert_eq!(policy.keyword_importance(3), 90.0);
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

pub mod rules;

pub use rules::{
    default_rules, BudgetConsumptionRule, OverbidRule, PenaltyContext, PenaltyRule, RuleHit,
};

/// Default per-auction budget consumption ceiling
pub const DEFAULT_MAX_BUDGET_CONSUMPTION_PER_AUCTION: f64 = 0.5;

/// Default remaining-budget fraction at which decay engages
pub const DEFAULT_STOP_PENALTY_PERCENT: f64 = 0.25;

/// Default penalty decay (0 = penalty fully waived)
pub const DEFAULT_STOP_PENALTY_DECAY: f64 = 0.0;

/// Default importance of a non-priority keyword
pub const DEFAULT_KEYWORD_BASE_IMPORTANCE: f64 = 10.0;

/// Errors raised when a policy is malformed or cannot be loaded
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("Policy field '{field}' must be in [0, 1], got {value}")]
    FractionOutOfRange { field: &'static str, value: f64 },

    #[error("Policy field '{field}' must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("Failed to read policy file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse policy: {0}")]
    Parse(String),

    #[error("Failed to serialize policy: {0}")]
    Serialization(String),
}

/// Reward function tuning parameters
///
/// Missing fields take their defaults when deserialized, so a config file
/// only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewardPolicy {
    /// Fraction of the pre-auction budget (remaining + cost just paid) a
    /// single bid may use before it is penalized
    pub max_budget_consumption_per_auction: f64,

    /// Once remaining budget / initial budget is at or below this, the
    /// penalty fraction is multiplied by `stop_penalty_decay`
    pub stop_penalty_percent: f64,

    /// Multiplier applied to the penalty once the stop threshold is reached
    ///
    /// - 0.0: penalty fully waived
    /// - 1.0: penalty unchanged
    pub stop_penalty_decay: f64,

    /// Importance of non-priority keywords. Priority keywords use
    /// `keyword_base_importance * rank²`.
    pub keyword_base_importance: f64,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            max_budget_consumption_per_auction: DEFAULT_MAX_BUDGET_CONSUMPTION_PER_AUCTION,
            stop_penalty_percent: DEFAULT_STOP_PENALTY_PERCENT,
            stop_penalty_decay: DEFAULT_STOP_PENALTY_DECAY,
            keyword_base_importance: DEFAULT_KEYWORD_BASE_IMPORTANCE,
        }
    }
}

impl RewardPolicy {
    /// Parse and validate a policy from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Parse` for malformed JSON or unknown fields and
    /// any error from [`RewardPolicy::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        let policy: RewardPolicy =
            serde_json::from_str(json).map_err(|e| PolicyError::Parse(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Read, parse and validate a policy from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| PolicyError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<(), PolicyError> {
        for (field, value) in [
            (
                "max_budget_consumption_per_auction",
                self.max_budget_consumption_per_auction,
            ),
            ("stop_penalty_percent", self.stop_penalty_percent),
            ("stop_penalty_decay", self.stop_penalty_decay),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PolicyError::FractionOutOfRange { field, value });
            }
        }

        if !self.keyword_base_importance.is_finite() {
            return Err(PolicyError::NonFinite {
                field: "keyword_base_importance",
                value: self.keyword_base_importance,
            });
        }

        Ok(())
    }

    /// Importance of a keyword of the given rank
    ///
    /// Non-priority keywords (rank 0) get the base importance; priority
    /// keywords scale quadratically with their rank.
    pub fn keyword_importance(&self, keyword_rank: u32) -> f64 {
        if keyword_rank == 0 {
            return self.keyword_base_importance;
        }
        let rank = u64::from(keyword_rank);
        self.keyword_base_importance * (rank * rank) as f64
    }

    /// Largest bid allowed before the budget consumption penalty applies
    pub fn budget_consumption_max(&self, pre_auction_budget: f64) -> f64 {
        self.max_budget_consumption_per_auction * pre_auction_budget
    }

    /// Check if late-episode leniency applies at this budget fraction
    pub fn stop_penalty_engaged(&self, percent_budget_left: f64) -> bool {
        percent_budget_left <= self.stop_penalty_percent
    }

    /// Deterministic SHA-256 fingerprint of this policy
    ///
    /// Serializes through `serde_json::Value`, whose object keys are sorted,
    /// so the hash does not depend on field declaration order.
    pub fn config_hash(&self) -> Result<String, PolicyError> {
        let value =
            serde_json::to_value(self).map_err(|e| PolicyError::Serialization(e.to_string()))?;
        let json =
            serde_json::to_string(&value).map_err(|e| PolicyError::Serialization(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}
