//! Penalty rules for won auctions
//!
//! A won auction is scored as the keyword's importance minus a fraction of
//! that importance. The fraction is the sum of the addends of every rule
//! that fires, evaluated in order. Rules only see the outcome and the
//! policy; they never see each other.
//!
//! Default rule set, in evaluation order:
//! 1. [`BudgetConsumptionRule`]: bid exceeds the per-auction budget ceiling
//! 2. [`OverbidRule`]: bid is at least 1.5x the realized cost
//!
//! # Adding a rule
//!
//! ```rust
//! use bid_reward_core_rs::policy::{PenaltyContext, PenaltyRule, RuleHit};
//!
//! #[derive(Debug)]
//! struct ZeroCostRule;
//!
//! impl PenaltyRule for ZeroCostRule {
//!     fn name(&self) -> &'static str {
//!         "zero_cost"
//!     }
//!
//!     fn evaluate(&self, ctx: &PenaltyContext<'_>) -> Option<RuleHit> {
//!         (ctx.outcome.cost == 0.0).then(|| RuleHit {
//!             fraction: 0.1,
//!             reason: "slot was free".to_string(),
//!         })
//!     }
//! }
//! ```

use std::fmt::Debug;

use crate::models::AuctionOutcome;
use crate::policy::RewardPolicy;

/// Penalty fraction added when a bid consumes too much of the budget
pub const BUDGET_OVERUSE_PENALTY: f64 = 0.2;

/// Penalty fraction added for overbidding relative to cost
pub const OVERBID_PENALTY: f64 = 0.2;

/// Bid-to-cost ratio at which a bid counts as an overbid
pub const OVERBID_COST_MULTIPLE: f64 = 1.5;

/// Inputs visible to a penalty rule
#[derive(Debug, Clone, Copy)]
pub struct PenaltyContext<'a> {
    pub outcome: &'a AuctionOutcome,
    pub policy: &'a RewardPolicy,
    /// Largest bid allowed by the per-auction consumption ceiling
    pub budget_consumption_max: f64,
}

impl<'a> PenaltyContext<'a> {
    pub fn new(outcome: &'a AuctionOutcome, policy: &'a RewardPolicy) -> Self {
        Self {
            outcome,
            policy,
            budget_consumption_max: policy.budget_consumption_max(outcome.pre_auction_budget()),
        }
    }
}

/// A rule that fired, with its contribution to the penalty fraction
#[derive(Debug, Clone, PartialEq)]
pub struct RuleHit {
    pub fraction: f64,
    pub reason: String,
}

/// One entry in the ordered penalty rule list
pub trait PenaltyRule: Debug + Send + Sync {
    /// Stable identifier used in traces
    fn name(&self) -> &'static str;

    /// Return the penalty addend if the rule applies to this outcome
    fn evaluate(&self, ctx: &PenaltyContext<'_>) -> Option<RuleHit>;
}

/// Penalizes bids larger than the per-auction consumption ceiling
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetConsumptionRule {
    pub penalty: f64,
}

impl Default for BudgetConsumptionRule {
    fn default() -> Self {
        Self {
            penalty: BUDGET_OVERUSE_PENALTY,
        }
    }
}

impl PenaltyRule for BudgetConsumptionRule {
    fn name(&self) -> &'static str {
        "budget_consumption"
    }

    fn evaluate(&self, ctx: &PenaltyContext<'_>) -> Option<RuleHit> {
        let bid = ctx.outcome.bid_amount;
        if bid > ctx.budget_consumption_max {
            Some(RuleHit {
                fraction: self.penalty,
                reason: format!(
                    "bid {} is > {}, too much of the budget",
                    bid, ctx.budget_consumption_max
                ),
            })
        } else {
            None
        }
    }
}

/// Penalizes bids far above the price actually paid
#[derive(Debug, Clone, PartialEq)]
pub struct OverbidRule {
    pub cost_multiple: f64,
    pub penalty: f64,
}

impl Default for OverbidRule {
    fn default() -> Self {
        Self {
            cost_multiple: OVERBID_COST_MULTIPLE,
            penalty: OVERBID_PENALTY,
        }
    }
}

impl PenaltyRule for OverbidRule {
    fn name(&self) -> &'static str {
        "overbid"
    }

    fn evaluate(&self, ctx: &PenaltyContext<'_>) -> Option<RuleHit> {
        let bid = ctx.outcome.bid_amount;
        let cost = ctx.outcome.cost;
        if bid >= self.cost_multiple * cost {
            Some(RuleHit {
                fraction: self.penalty,
                reason: format!(
                    "bid {} is >= {} times the cost {}",
                    bid, self.cost_multiple, cost
                ),
            })
        } else {
            None
        }
    }
}

/// The standard rule list, in evaluation order
pub fn default_rules() -> Vec<Box<dyn PenaltyRule>> {
    vec![
        Box::new(BudgetConsumptionRule::default()),
        Box::new(OverbidRule::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn won(bid_amount: f64, cost: f64, remaining_budget: f64) -> AuctionOutcome {
        AuctionOutcome {
            bid_amount,
            cost,
            remaining_budget,
            margin: bid_amount - cost,
            won: true,
            bid_placed: true,
            ..AuctionOutcome::default()
        }
    }

    #[test]
    fn test_context_reconstructs_pre_auction_budget() {
        let policy = RewardPolicy::default();
        let outcome = won(10.0, 20.0, 80.0);
        let ctx = PenaltyContext::new(&outcome, &policy);
        // 0.5 * (80 + 20)
        assert_eq!(ctx.budget_consumption_max, 50.0);
    }

    #[test]
    fn test_budget_rule_fires_strictly_above_ceiling() {
        let policy = RewardPolicy::default();
        let rule = BudgetConsumptionRule::default();

        let at_ceiling = won(50.0, 20.0, 80.0);
        assert!(rule
            .evaluate(&PenaltyContext::new(&at_ceiling, &policy))
            .is_none());

        let above = won(50.5, 20.0, 80.0);
        let hit = rule
            .evaluate(&PenaltyContext::new(&above, &policy))
            .unwrap();
        assert_eq!(hit.fraction, 0.2);
    }

    #[test]
    fn test_overbid_rule_is_inclusive() {
        let policy = RewardPolicy::default();
        let rule = OverbidRule::default();

        let exactly = won(15.0, 10.0, 1000.0);
        assert!(rule
            .evaluate(&PenaltyContext::new(&exactly, &policy))
            .is_some());

        let below = won(14.9, 10.0, 1000.0);
        assert!(rule
            .evaluate(&PenaltyContext::new(&below, &policy))
            .is_none());
    }

    #[test]
    fn test_overbid_rule_fires_on_zero_cost() {
        let policy = RewardPolicy::default();
        let rule = OverbidRule::default();
        let free = won(0.0, 0.0, 1000.0);
        // 0 >= 1.5 * 0
        assert!(rule.evaluate(&PenaltyContext::new(&free, &policy)).is_some());
    }

    #[test]
    fn test_default_rules_order() {
        let names: Vec<&str> = default_rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["budget_consumption", "overbid"]);
    }
}
