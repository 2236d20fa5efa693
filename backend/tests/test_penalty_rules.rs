//! Tests for penalty rule evaluation on won auctions
//!
//! Tests cover:
//! - Each default rule in isolation
//! - Partial stop-penalty decay
//! - Threshold boundaries
//! - Custom and replaced rule sets

use bid_reward_core_rs::policy::{
    BudgetConsumptionRule, OverbidRule, PenaltyContext, PenaltyRule, RuleHit,
};
use bid_reward_core_rs::{AuctionOutcome, RewardCalculator, RewardPolicy};

const INITIAL_BUDGET: f64 = 100.0;

fn won(
    keyword_rank: u32,
    bid_amount: f64,
    cost: f64,
    remaining_budget: f64,
    margin: f64,
) -> AuctionOutcome {
    AuctionOutcome {
        bid_amount,
        cost,
        remaining_budget,
        keyword_rank,
        margin,
        won: true,
        bid_placed: true,
        ..AuctionOutcome::default()
    }
}

fn calculator_with(policy: RewardPolicy) -> RewardCalculator {
    RewardCalculator::new(policy).unwrap()
}

#[test]
fn test_only_budget_rule_fires() {
    // ceiling 0.5 * (50 + 50) = 50 < 60; 60 < 1.5 * 50
    let outcome = won(1, 60.0, 50.0, 50.0, 10.0);
    let breakdown = RewardCalculator::default()
        .evaluate(&outcome, INITIAL_BUDGET)
        .unwrap();

    assert_eq!(breakdown.trace.fired_rules(), vec!["budget_consumption"]);
    assert_eq!(breakdown.penalty_fraction, Some(0.2));
    // (10 - 10 + 1) - 10 * 0.2
    assert!((breakdown.reward - (-1.0)).abs() < 1e-10);
}

#[test]
fn test_only_overbid_rule_fires() {
    // ceiling 0.5 * (90 + 4) = 47 > 6; 6 >= 1.5 * 4
    let outcome = won(2, 6.0, 4.0, 90.0, 2.0);
    let breakdown = RewardCalculator::default()
        .evaluate(&outcome, INITIAL_BUDGET)
        .unwrap();

    assert_eq!(breakdown.trace.fired_rules(), vec!["overbid"]);
    // (40 - 2 + 1) - 40 * 0.2
    assert!((breakdown.reward - 31.0).abs() < 1e-10);
}

#[test]
fn test_no_rule_fires() {
    let outcome = won(2, 5.0, 4.0, 90.0, 1.0);
    let breakdown = RewardCalculator::default()
        .evaluate(&outcome, INITIAL_BUDGET)
        .unwrap();

    assert!(breakdown.trace.fired_rules().is_empty());
    assert_eq!(breakdown.penalty_fraction, Some(0.0));
    assert_eq!(breakdown.reward, 40.0);
}

#[test]
fn test_partial_decay_halves_penalty() {
    let calculator = calculator_with(RewardPolicy {
        stop_penalty_decay: 0.5,
        ..RewardPolicy::default()
    });
    let outcome = won(2, 100.0, 50.0, 20.0, 0.0);

    let breakdown = calculator.evaluate(&outcome, INITIAL_BUDGET).unwrap();
    assert!(breakdown.trace.decay_applied());
    // 41 - 40 * 0.2
    assert!((breakdown.reward - 33.0).abs() < 1e-10);
}

#[test]
fn test_full_decay_keeps_penalty() {
    let calculator = calculator_with(RewardPolicy {
        stop_penalty_decay: 1.0,
        ..RewardPolicy::default()
    });
    let outcome = won(2, 100.0, 50.0, 20.0, 0.0);

    let reward = calculator.compute(&outcome, INITIAL_BUDGET, false).unwrap();
    assert!((reward - 25.0).abs() < 1e-10);
}

#[test]
fn test_decay_applies_at_exact_threshold() {
    // 25 / 100 == 0.25
    let outcome = won(2, 100.0, 50.0, 25.0, 0.0);
    let breakdown = RewardCalculator::default()
        .evaluate(&outcome, INITIAL_BUDGET)
        .unwrap();

    assert!(breakdown.trace.decay_applied());
    assert_eq!(breakdown.reward, 41.0);
}

#[test]
fn test_decay_not_applied_above_threshold() {
    let outcome = won(2, 100.0, 50.0, 26.0, 0.0);
    let breakdown = RewardCalculator::default()
        .evaluate(&outcome, INITIAL_BUDGET)
        .unwrap();

    assert!(!breakdown.trace.decay_applied());
    assert!((breakdown.reward - 25.0).abs() < 1e-10);
}

#[test]
fn test_decay_waives_budget_penalty_late_in_episode() {
    // ceiling 0.5 * 15 = 7.5 < 10, but only 5% of the budget is left
    let outcome = won(0, 10.0, 10.0, 5.0, 0.0);
    let breakdown = RewardCalculator::default()
        .evaluate(&outcome, INITIAL_BUDGET)
        .unwrap();

    assert_eq!(breakdown.trace.fired_rules(), vec!["budget_consumption"]);
    assert!(breakdown.trace.decay_applied());
    assert_eq!(breakdown.reward, 11.0);
}

#[test]
fn test_consumption_ceiling_follows_policy() {
    let calculator = calculator_with(RewardPolicy {
        max_budget_consumption_per_auction: 1.0,
        ..RewardPolicy::default()
    });
    // ceiling 1.0 * (50 + 50) = 100, not exceeded
    let outcome = won(1, 60.0, 50.0, 50.0, 10.0);

    let breakdown = calculator.evaluate(&outcome, INITIAL_BUDGET).unwrap();
    assert!(breakdown.trace.fired_rules().is_empty());
    assert_eq!(breakdown.reward, 1.0);
}

#[test]
fn test_base_importance_follows_policy() {
    let calculator = calculator_with(RewardPolicy {
        keyword_base_importance: 5.0,
        ..RewardPolicy::default()
    });
    let outcome = won(2, 5.0, 4.0, 90.0, 1.0);
    // 5 * 4 - 1 + 1
    assert_eq!(calculator.compute(&outcome, INITIAL_BUDGET, false).unwrap(), 20.0);
}

#[derive(Debug)]
struct FlatRule;

impl PenaltyRule for FlatRule {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn evaluate(&self, _ctx: &PenaltyContext<'_>) -> Option<RuleHit> {
        Some(RuleHit {
            fraction: 0.1,
            reason: "always".to_string(),
        })
    }
}

#[test]
fn test_custom_rule_appended_after_defaults() {
    let calculator = RewardCalculator::default().with_rule(FlatRule);
    assert_eq!(
        calculator.rule_names(),
        vec!["budget_consumption", "overbid", "flat"]
    );

    let outcome = won(0, 10.0, 10.0, 80.0, 0.0);
    let breakdown = calculator.evaluate(&outcome, INITIAL_BUDGET).unwrap();
    assert_eq!(breakdown.trace.fired_rules(), vec!["flat"]);
    // 11 - 10 * 0.1
    assert!((breakdown.reward - 10.0).abs() < 1e-10);
}

#[test]
fn test_empty_rule_set_never_penalizes() {
    let calculator = RewardCalculator::default().with_rules(Vec::new());
    let outcome = won(2, 100.0, 50.0, 50.0, 0.0);
    assert_eq!(calculator.compute(&outcome, INITIAL_BUDGET, false).unwrap(), 41.0);
}

#[test]
fn test_rules_can_be_tuned() {
    let calculator = RewardCalculator::default().with_rules(vec![
        Box::new(BudgetConsumptionRule { penalty: 0.5 }),
        Box::new(OverbidRule {
            cost_multiple: 3.0,
            penalty: 0.25,
        }),
    ]);
    // ceiling 50 < 100 fires; 100 >= 3 * 50 does not
    let outcome = won(2, 100.0, 50.0, 50.0, 0.0);
    let breakdown = calculator.evaluate(&outcome, INITIAL_BUDGET).unwrap();

    assert_eq!(breakdown.trace.fired_rules(), vec!["budget_consumption"]);
    // 41 - 40 * 0.5
    assert_eq!(breakdown.reward, 21.0);
}
