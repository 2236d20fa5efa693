//! Reward calculator
//!
//! Maps one auction outcome to one scalar reward. Branches are evaluated top
//! to bottom and the first terminal branch returns:
//!
//! 1. **No bid placed**: penalize acting on a missing keyword, reward
//!    abstaining when nothing important was on offer, and penalize passing
//!    over priority keywords in proportion to their weight.
//! 2. **Bid placed, auction lost**: fixed -10, whatever the keyword rank, so
//!    the agent is not scared away from important keywords.
//! 3. **Bid placed, auction won**: keyword importance, less the bid/cost
//!    gap, less a fraction of the importance accumulated by the penalty
//!    rules (decayed once the budget is nearly spent).
//!
//! # Critical Invariants
//!
//! 1. The reward is a pure function of (outcome, policy, initial budget)
//! 2. Verbose output never changes the returned value
//! 3. Malformed input fails with a typed error instead of a degraded reward

use thiserror::Error;

use crate::models::{AuctionOutcome, OutcomeError, RewardBranch, RewardEvent, RewardTrace};
use crate::policy::{default_rules, PenaltyContext, PenaltyRule, PolicyError, RewardPolicy};

/// Penalty for acting on a keyword that was not available this step
pub const UNAVAILABLE_KEYWORD_PENALTY: f64 = 10.0;

/// Penalty adjustment when abstaining with no priority keyword on offer
pub const NO_ALTERNATIVES_ADJUSTMENT: f64 = -1.0;

/// Reward for any lost auction
pub const LOST_AUCTION_REWARD: f64 = -10.0;

/// A bid/cost gap of this size is treated as ideal
pub const IDEAL_MARGIN_OFFSET: f64 = 1.0;

/// Tracing target for verbose reward traces
pub const TRACE_TARGET: &str = "bid_reward::trace";

/// Errors that prevent a reward from being computed
#[derive(Debug, Error, PartialEq)]
pub enum RewardError {
    #[error("Initial budget must be positive and finite, got {0}")]
    InvalidInitialBudget(f64),

    #[error("Invalid auction outcome: {0}")]
    Outcome(#[from] OutcomeError),

    #[error("Invalid reward policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("Reward for the {branch} branch is not finite ({value}); policy weights overflow f64")]
    NonFiniteReward { branch: RewardBranch, value: f64 },

    #[error("Episode step {index}: {source}")]
    Step {
        index: usize,
        source: Box<RewardError>,
    },
}

/// Full result of scoring one outcome
#[derive(Debug, Clone, PartialEq)]
pub struct RewardBreakdown {
    /// The scalar reward
    pub reward: f64,

    /// Terminal branch that produced it
    pub branch: RewardBranch,

    /// Penalty fraction after decay (won auctions only)
    pub penalty_fraction: Option<f64>,

    /// Diagnostic trace of the computation
    pub trace: RewardTrace,
}

/// Scores auction outcomes under a fixed policy and rule set
///
/// The calculator holds no mutable state and is `Send + Sync`, so one
/// instance can score many episodes from many threads.
///
/// # Example
/// ```
/// use bid_reward_core_rs::{AuctionOutcome, RewardCalculator, RewardPolicy};
///
/// let calculator = RewardCalculator::new(RewardPolicy::default()).unwrap();
///
/// let outcome = AuctionOutcome {
///     bid_amount: 10.0,
///     cost: 10.0,
///     remaining_budget: 900.0,
///     won: true,
///     bid_placed: true,
///     ..AuctionOutcome::default()
/// };
///
/// let reward = calculator.compute(&outcome, 1000.0, false).unwrap();
/// assert_eq!(reward, 11.0);
/// ```
#[derive(Debug)]
pub struct RewardCalculator {
    policy: RewardPolicy,
    rules: Vec<Box<dyn PenaltyRule>>,
}

impl Default for RewardCalculator {
    fn default() -> Self {
        Self {
            policy: RewardPolicy::default(),
            rules: default_rules(),
        }
    }
}

impl RewardCalculator {
    /// Create a calculator with the default penalty rules
    ///
    /// # Errors
    ///
    /// Returns `RewardError::Policy` if the policy fails validation.
    pub fn new(policy: RewardPolicy) -> Result<Self, RewardError> {
        policy.validate()?;
        Ok(Self {
            policy,
            rules: default_rules(),
        })
    }

    /// Append a rule after the existing ones
    pub fn with_rule(mut self, rule: impl PenaltyRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Replace the whole rule list
    pub fn with_rules(mut self, rules: Vec<Box<dyn PenaltyRule>>) -> Self {
        self.rules = rules;
        self
    }

    pub fn policy(&self) -> &RewardPolicy {
        &self.policy
    }

    /// Names of the active rules, in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Score an outcome and return the reward only
    ///
    /// With `verbose` set, each trace event is emitted through `tracing` at
    /// info level under [`TRACE_TARGET`].
    pub fn compute(
        &self,
        outcome: &AuctionOutcome,
        initial_budget: f64,
        verbose: bool,
    ) -> Result<f64, RewardError> {
        let breakdown = self.evaluate(outcome, initial_budget)?;

        if verbose {
            for event in breakdown.trace.events() {
                tracing::info!(target: TRACE_TARGET, kind = event.event_type(), "{}", event);
            }
        }

        Ok(breakdown.reward)
    }

    /// Score an outcome and return the reward with its trace
    pub fn evaluate(
        &self,
        outcome: &AuctionOutcome,
        initial_budget: f64,
    ) -> Result<RewardBreakdown, RewardError> {
        if !(initial_budget.is_finite() && initial_budget > 0.0) {
            return Err(RewardError::InvalidInitialBudget(initial_budget));
        }
        outcome.validate()?;

        let mut trace = RewardTrace::new();

        let (branch, reward, penalty_fraction) = if !outcome.bid_placed {
            trace.log(RewardEvent::BranchSelected {
                branch: RewardBranch::NoBid,
            });
            let reward = self.score_abstention(outcome, &mut trace);
            (RewardBranch::NoBid, reward, None)
        } else if !outcome.won {
            trace.log(RewardEvent::BranchSelected {
                branch: RewardBranch::Lost,
            });
            (RewardBranch::Lost, LOST_AUCTION_REWARD, None)
        } else {
            trace.log(RewardEvent::BranchSelected {
                branch: RewardBranch::Won,
            });
            let (reward, fraction) = self.score_win(outcome, initial_budget, &mut trace);
            (RewardBranch::Won, reward, Some(fraction))
        };

        if !reward.is_finite() {
            return Err(RewardError::NonFiniteReward {
                branch,
                value: reward,
            });
        }
        trace.log(RewardEvent::RewardComputed { branch, reward });

        Ok(RewardBreakdown {
            reward,
            branch,
            penalty_fraction,
            trace,
        })
    }

    fn score_abstention(&self, outcome: &AuctionOutcome, trace: &mut RewardTrace) -> f64 {
        let mut penalty = 0.0;

        if !outcome.chosen_keyword_available {
            penalty += UNAVAILABLE_KEYWORD_PENALTY;
            trace.log(RewardEvent::UnavailableKeyword {
                penalty: UNAVAILABLE_KEYWORD_PENALTY,
            });
        }

        let count = outcome.num_other_high_rank_keywords();
        if count == 0 {
            penalty += NO_ALTERNATIVES_ADJUSTMENT;
            trace.log(RewardEvent::NoPriorityAlternatives {
                adjustment: NO_ALTERNATIVES_ADJUSTMENT,
            });
        } else {
            let weight_total = outcome.other_high_rank_weight_total();
            let missed = self.policy.keyword_base_importance * weight_total;
            penalty += missed;
            trace.log(RewardEvent::MissedPriorityKeywords {
                count,
                weight_total,
                penalty: missed,
            });
        }

        -penalty
    }

    fn score_win(
        &self,
        outcome: &AuctionOutcome,
        initial_budget: f64,
        trace: &mut RewardTrace,
    ) -> (f64, f64) {
        let importance = self.policy.keyword_importance(outcome.keyword_rank);
        trace.log(RewardEvent::KeywordImportance {
            rank: outcome.keyword_rank,
            importance,
        });

        let ctx = PenaltyContext::new(outcome, &self.policy);
        let mut penalty_fraction = 0.0;
        for rule in &self.rules {
            if let Some(hit) = rule.evaluate(&ctx) {
                penalty_fraction += hit.fraction;
                trace.log(RewardEvent::PenaltyRuleFired {
                    rule: rule.name(),
                    fraction: hit.fraction,
                    reason: hit.reason,
                });
            }
        }

        let percent_budget_left = outcome.remaining_budget / initial_budget;
        if self.policy.stop_penalty_engaged(percent_budget_left) {
            let before = penalty_fraction;
            penalty_fraction *= self.policy.stop_penalty_decay;
            trace.log(RewardEvent::StopPenaltyDecay {
                percent_budget_left,
                threshold: self.policy.stop_penalty_percent,
                before,
                after: penalty_fraction,
            });
        }

        trace.log(RewardEvent::PenaltyFraction {
            fraction: penalty_fraction,
        });

        let diff_bid = outcome.margin.abs();
        let reward =
            (importance - diff_bid + IDEAL_MARGIN_OFFSET) - importance * penalty_fraction;

        (reward, penalty_fraction)
    }
}

/// Score one outcome under `policy` with the default rules
///
/// Convenience wrapper for callers that do not keep a [`RewardCalculator`].
pub fn compute_reward(
    outcome: &AuctionOutcome,
    initial_budget: f64,
    policy: &RewardPolicy,
    verbose: bool,
) -> Result<f64, RewardError> {
    RewardCalculator::new(policy.clone())?.compute(outcome, initial_budget, verbose)
}
