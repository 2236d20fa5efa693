//! Diagnostic trace of a reward computation.
//!
//! Every call to the reward calculator records which branches fired and
//! which penalties were applied. The trace is observational only: it is
//! built the same way whether or not verbose output is requested, and
//! nothing in it feeds back into the reward.
//!
//! # Event Types
//!
//! - **Branch**: which of the three terminal branches was taken
//! - **Abstention**: penalties and bonuses when no bid was placed
//! - **Win**: keyword importance, penalty rule hits, stop-penalty decay
//! - **Result**: the final reward
//!
//! # Example
//!
//! ```rust
//! use bid_reward_core_rs::models::{RewardBranch, RewardEvent};
//!
//! let event = RewardEvent::RewardComputed {
//!     branch: RewardBranch::Won,
//!     reward: 11.0,
//! };
//!
//! assert_eq!(event.event_type(), "RewardComputed");
//! println!("{}", event);
//! ```

use std::fmt;

/// Terminal branch of the reward policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardBranch {
    /// Agent abstained from bidding
    NoBid,
    /// Agent bid and lost the auction
    Lost,
    /// Agent bid and won the auction
    Won,
}

impl RewardBranch {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardBranch::NoBid => "no_bid",
            RewardBranch::Lost => "lost",
            RewardBranch::Won => "won",
        }
    }
}

impl fmt::Display for RewardBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single step of a reward computation.
///
/// Events are recorded in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum RewardEvent {
    /// Branch chosen from the bid/win flags
    BranchSelected { branch: RewardBranch },

    /// Agent acted on a keyword that did not exist this step
    UnavailableKeyword { penalty: f64 },

    /// No priority keyword was on offer, so abstaining earns a small bonus
    NoPriorityAlternatives { adjustment: f64 },

    /// Agent abstained while priority keywords were on offer
    MissedPriorityKeywords {
        count: usize,
        weight_total: f64,
        penalty: f64,
    },

    /// Keyword importance used for a won auction
    KeywordImportance { rank: u32, importance: f64 },

    /// A penalty rule fired and added to the penalty fraction
    PenaltyRuleFired {
        rule: &'static str,
        fraction: f64,
        reason: String,
    },

    /// Remaining budget fell to the stop threshold; penalty was decayed
    StopPenaltyDecay {
        percent_budget_left: f64,
        threshold: f64,
        before: f64,
        after: f64,
    },

    /// Total penalty fraction applied to a won auction
    PenaltyFraction { fraction: f64 },

    /// Final reward for this outcome
    RewardComputed { branch: RewardBranch, reward: f64 },
}

impl RewardEvent {
    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            RewardEvent::BranchSelected { .. } => "BranchSelected",
            RewardEvent::UnavailableKeyword { .. } => "UnavailableKeyword",
            RewardEvent::NoPriorityAlternatives { .. } => "NoPriorityAlternatives",
            RewardEvent::MissedPriorityKeywords { .. } => "MissedPriorityKeywords",
            RewardEvent::KeywordImportance { .. } => "KeywordImportance",
            RewardEvent::PenaltyRuleFired { .. } => "PenaltyRuleFired",
            RewardEvent::StopPenaltyDecay { .. } => "StopPenaltyDecay",
            RewardEvent::PenaltyFraction { .. } => "PenaltyFraction",
            RewardEvent::RewardComputed { .. } => "RewardComputed",
        }
    }

    /// Get the rule name if this event is a penalty rule hit
    pub fn rule(&self) -> Option<&'static str> {
        match self {
            RewardEvent::PenaltyRuleFired { rule, .. } => Some(rule),
            _ => None,
        }
    }
}

impl fmt::Display for RewardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardEvent::BranchSelected { branch } => write!(f, "branch: {}", branch),
            RewardEvent::UnavailableKeyword { penalty } => {
                write!(f, "chosen keyword not available this step, penalty += {}", penalty)
            }
            RewardEvent::NoPriorityAlternatives { adjustment } => write!(
                f,
                "no priority keywords available, abstaining is fine, penalty += {}",
                adjustment
            ),
            RewardEvent::MissedPriorityKeywords {
                count,
                weight_total,
                penalty,
            } => write!(
                f,
                "chose not to bid but {} priority keyword(s) were available (total weight {}), penalty += {}",
                count, weight_total, penalty
            ),
            RewardEvent::KeywordImportance { rank, importance } => {
                write!(f, "keyword rank {} has importance {}", rank, importance)
            }
            RewardEvent::PenaltyRuleFired {
                rule,
                fraction,
                reason,
            } => write!(f, "{}: {} (penalty fraction += {})", rule, reason, fraction),
            RewardEvent::StopPenaltyDecay {
                percent_budget_left,
                threshold,
                before,
                after,
            } => write!(
                f,
                "penalty would have been {}, but {} of budget left is <= {}; decayed penalty is {}",
                before, percent_budget_left, threshold, after
            ),
            RewardEvent::PenaltyFraction { fraction } => {
                write!(f, "total penalty fraction: {}", fraction)
            }
            RewardEvent::RewardComputed { branch, reward } => {
                write!(f, "final reward ({}): {}", branch, reward)
            }
        }
    }
}

/// Ordered trace of the events of one reward computation.
///
/// This is a simple wrapper around `Vec<RewardEvent>` with query helpers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardTrace {
    events: Vec<RewardEvent>,
}

impl RewardTrace {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event to the trace
    pub fn log(&mut self, event: RewardEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[RewardEvent] {
        &self.events
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&RewardEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Names of the penalty rules that fired, in firing order
    pub fn fired_rules(&self) -> Vec<&'static str> {
        self.events.iter().filter_map(RewardEvent::rule).collect()
    }

    /// Check whether the stop-penalty decay was applied
    pub fn decay_applied(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, RewardEvent::StopPenaltyDecay { .. }))
    }
}
