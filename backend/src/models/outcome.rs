//! Auction outcome model
//!
//! One record per bidding decision, produced by the auction simulator after
//! the auction resolves. Each outcome has:
//! - Bid amount and realized cost
//! - Budget left after the auction
//! - Keyword rank (0 = non-priority, larger = higher priority)
//! - Signed margin (bid - cost)
//! - Bid/win flags
//! - Availability of the chosen keyword and of other priority keywords
//!
//! Field names follow Rust conventions, but deserialization also accepts the
//! simulator's dictionary keys (`rank`, `win`, `bid`,
//! `choosen_keyword_available`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised when an outcome record breaks its contract
#[derive(Debug, Error, PartialEq)]
pub enum OutcomeError {
    #[error("Field '{field}' must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("Field '{field}' must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("Outcome claims a win but no bid was placed")]
    WinWithoutBid,

    #[error("Weight for keyword '{keyword}' must be finite, got {value}")]
    NonFiniteKeywordWeight { keyword: String, value: f64 },

    #[error("Keyword '{keyword}' appears more than once")]
    DuplicateKeyword { keyword: String },
}

/// Build the priority-keyword weight map, rejecting repeated keywords
///
/// Callers converting foreign keys to strings (e.g. Python `1` and `"1"`)
/// use this so that distinct source keys never silently merge.
pub fn keyword_weights<I>(pairs: I) -> Result<BTreeMap<String, f64>, OutcomeError>
where
    I: IntoIterator<Item = (String, f64)>,
{
    let mut weights = BTreeMap::new();
    for (keyword, weight) in pairs {
        if weights.contains_key(&keyword) {
            return Err(OutcomeError::DuplicateKeyword { keyword });
        }
        weights.insert(keyword, weight);
    }
    Ok(weights)
}

fn default_true() -> bool {
    true
}

/// Result of a single keyword auction, as seen by the reward function
///
/// # Example
/// ```
/// use bid_reward_core_rs::AuctionOutcome;
///
/// let outcome = AuctionOutcome {
///     bid_amount: 12.0,
///     cost: 11.0,
///     remaining_budget: 900.0,
///     keyword_rank: 2,
///     margin: 1.0,
///     won: true,
///     bid_placed: true,
///     ..AuctionOutcome::default()
/// };
///
/// assert!(outcome.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionOutcome {
    /// Amount the agent bid (0 if it abstained)
    pub bid_amount: f64,

    /// Price actually charged for the slot
    pub cost: f64,

    /// Budget left after this auction
    pub remaining_budget: f64,

    /// Priority tier of the keyword; 0 means non-priority
    #[serde(alias = "rank")]
    pub keyword_rank: u32,

    /// Bid minus cost. Only the magnitude is scored.
    pub margin: f64,

    /// Whether the agent won the auction
    #[serde(alias = "win")]
    pub won: bool,

    /// Whether the agent placed any bid at all
    #[serde(alias = "bid")]
    pub bid_placed: bool,

    /// Whether the keyword the agent acted on existed this step
    #[serde(alias = "choosen_keyword_available", default = "default_true")]
    pub chosen_keyword_available: bool,

    /// Priority keywords the agent could have bid on instead, with their
    /// importance weights. Only consulted when no bid was placed.
    #[serde(default)]
    pub other_high_rank_keywords_available: BTreeMap<String, f64>,
}

impl Default for AuctionOutcome {
    /// An abstention on an available non-priority keyword with nothing
    /// better on offer.
    fn default() -> Self {
        Self {
            bid_amount: 0.0,
            cost: 0.0,
            remaining_budget: 0.0,
            keyword_rank: 0,
            margin: 0.0,
            won: false,
            bid_placed: false,
            chosen_keyword_available: true,
            other_high_rank_keywords_available: BTreeMap::new(),
        }
    }
}

impl AuctionOutcome {
    /// Budget held before this auction: what is left plus what was just paid
    pub fn pre_auction_budget(&self) -> f64 {
        self.remaining_budget + self.cost
    }

    /// Number of alternative priority keywords the agent passed over
    pub fn num_other_high_rank_keywords(&self) -> usize {
        self.other_high_rank_keywords_available.len()
    }

    /// Sum of the importance weights of the alternative priority keywords
    pub fn other_high_rank_weight_total(&self) -> f64 {
        self.other_high_rank_keywords_available.values().sum()
    }

    /// Validate the record against its contract
    ///
    /// # Errors
    ///
    /// - Any numeric field is NaN or infinite
    /// - `bid_amount`, `cost` or `remaining_budget` is negative
    /// - `won` is set while `bid_placed` is not
    /// - A keyword weight is NaN or infinite
    pub fn validate(&self) -> Result<(), OutcomeError> {
        for (field, value) in [
            ("bid_amount", self.bid_amount),
            ("cost", self.cost),
            ("remaining_budget", self.remaining_budget),
            ("margin", self.margin),
        ] {
            if !value.is_finite() {
                return Err(OutcomeError::NonFinite { field, value });
            }
        }

        for (field, value) in [
            ("bid_amount", self.bid_amount),
            ("cost", self.cost),
            ("remaining_budget", self.remaining_budget),
        ] {
            if value < 0.0 {
                return Err(OutcomeError::Negative { field, value });
            }
        }

        if self.won && !self.bid_placed {
            return Err(OutcomeError::WinWithoutBid);
        }

        if let Some((keyword, value)) = self
            .other_high_rank_keywords_available
            .iter()
            .find(|(_, weight)| !weight.is_finite())
        {
            return Err(OutcomeError::NonFiniteKeywordWeight {
                keyword: keyword.clone(),
                value: *value,
            });
        }

        Ok(())
    }
}
