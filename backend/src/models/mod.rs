//! Domain models for reward computation

pub mod event;
pub mod outcome;

// Re-exports
pub use event::{RewardBranch, RewardEvent, RewardTrace};
pub use outcome::{keyword_weights, AuctionOutcome, OutcomeError};
