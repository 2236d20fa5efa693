//! Reward computation and episode aggregation
//!
//! See `calculator.rs` for the per-step reward and `aggregator.rs` for the
//! episode return.

pub mod aggregator;
pub mod calculator;

// Re-export main types for convenience
pub use aggregator::{aggregate, score_episode, EpisodeAggregator, EpisodeSummary};
pub use calculator::{
    compute_reward, RewardBreakdown, RewardCalculator, RewardError, IDEAL_MARGIN_OFFSET,
    LOST_AUCTION_REWARD, NO_ALTERNATIVES_ADJUSTMENT, TRACE_TARGET, UNAVAILABLE_KEYWORD_PENALTY,
};
