//! Tests for input contract enforcement
//!
//! Malformed input must fail with a typed error, never produce a reward.

use bid_reward_core_rs::{
    compute_reward, AuctionOutcome, OutcomeError, PolicyError, RewardCalculator, RewardError,
    RewardPolicy,
};

fn won_outcome() -> AuctionOutcome {
    AuctionOutcome {
        bid_amount: 10.0,
        cost: 10.0,
        remaining_budget: 500.0,
        won: true,
        bid_placed: true,
        ..AuctionOutcome::default()
    }
}

fn score(outcome: &AuctionOutcome, initial_budget: f64) -> Result<f64, RewardError> {
    compute_reward(outcome, initial_budget, &RewardPolicy::default(), false)
}

#[test]
fn test_zero_initial_budget() {
    assert_eq!(
        score(&won_outcome(), 0.0),
        Err(RewardError::InvalidInitialBudget(0.0))
    );
}

#[test]
fn test_negative_initial_budget() {
    assert_eq!(
        score(&won_outcome(), -100.0),
        Err(RewardError::InvalidInitialBudget(-100.0))
    );
}

#[test]
fn test_nan_initial_budget() {
    assert!(matches!(
        score(&won_outcome(), f64::NAN),
        Err(RewardError::InvalidInitialBudget(_))
    ));
}

#[test]
fn test_initial_budget_checked_for_every_branch() {
    // Abstentions never divide by the budget but still honour the contract
    assert!(score(&AuctionOutcome::default(), 0.0).is_err());
}

#[test]
fn test_win_without_bid() {
    let outcome = AuctionOutcome {
        won: true,
        bid_placed: false,
        ..AuctionOutcome::default()
    };
    assert_eq!(
        score(&outcome, 100.0),
        Err(RewardError::Outcome(OutcomeError::WinWithoutBid))
    );
}

#[test]
fn test_infinite_cost() {
    let mut outcome = won_outcome();
    outcome.cost = f64::INFINITY;
    assert_eq!(
        score(&outcome, 1000.0),
        Err(RewardError::Outcome(OutcomeError::NonFinite {
            field: "cost",
            value: f64::INFINITY
        }))
    );
}

#[test]
fn test_nan_remaining_budget() {
    let mut outcome = won_outcome();
    outcome.remaining_budget = f64::NAN;
    assert!(matches!(
        score(&outcome, 1000.0),
        Err(RewardError::Outcome(OutcomeError::NonFinite {
            field: "remaining_budget",
            ..
        }))
    ));
}

#[test]
fn test_negative_bid_amount() {
    let mut outcome = won_outcome();
    outcome.bid_amount = -1.0;
    assert_eq!(
        score(&outcome, 1000.0),
        Err(RewardError::Outcome(OutcomeError::Negative {
            field: "bid_amount",
            value: -1.0
        }))
    );
}

#[test]
fn test_nan_keyword_weight() {
    let mut outcome = AuctionOutcome::default();
    outcome
        .other_high_rank_keywords_available
        .insert("boots".to_string(), f64::NAN);
    assert!(matches!(
        score(&outcome, 1000.0),
        Err(RewardError::Outcome(OutcomeError::NonFiniteKeywordWeight { .. }))
    ));
}

#[test]
fn test_invalid_policy_through_free_function() {
    let policy = RewardPolicy {
        max_budget_consumption_per_auction: -0.5,
        ..RewardPolicy::default()
    };
    assert_eq!(
        compute_reward(&won_outcome(), 1000.0, &policy, false),
        Err(RewardError::Policy(PolicyError::FractionOutOfRange {
            field: "max_budget_consumption_per_auction",
            value: -0.5
        }))
    );
}

#[test]
fn test_error_messages_are_descriptive() {
    let err = RewardCalculator::default()
        .compute(&won_outcome(), 0.0, false)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Initial budget must be positive and finite, got 0"
    );
}
