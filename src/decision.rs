//! Unified decision envelope for selector outputs.
//!
//! A search driver usually wants more than the chosen id: which policy chose
//! it, what the shortlist looked like, and whether the pick was exploration.
//! [`Decision`] carries that, and [`DecisionNote`] is a small typed list of
//! "why this choice happened" markers suitable for logging and replay.

use std::fmt;

/// Which strategy produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Policy {
    Uniform,
    Ucb1,
    BestKReward,
    BestKVelocity,
    RecentKReward,
    RecentKVelocity,
    PureBestKVelocity,
    HierarchicalByAlgorithm,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Uniform => "uniform",
            Policy::Ucb1 => "ucb1",
            Policy::BestKReward => "best_k_reward",
            Policy::BestKVelocity => "best_k_velocity",
            Policy::RecentKReward => "recent_k_reward",
            Policy::RecentKVelocity => "recent_k_velocity",
            Policy::PureBestKVelocity => "pure_best_k_velocity",
            Policy::HierarchicalByAlgorithm => "hierarchical_by_algorithm",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit notes attached to a decision.
///
/// Prefer adding new variants over changing existing semantics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecisionNote<C> {
    /// An untried (or not yet rankable) choice was picked ahead of scored ones.
    ExploreFirst,

    /// Uniform draw from the eligible set.
    SampledUniform { round: u64 },

    /// Argmax of a deterministic score, with stable tie-breaks.
    DeterministicChoice { score: f64 },

    /// Only the top-`k` candidates by ranking score were eligible.
    Shortlist { k: usize, retained: Vec<C> },

    /// Stage 1 of a hierarchical pick selected this group.
    GroupChosen { group: String, members: Vec<C> },
}

/// A single selection in a unified envelope.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision<C> {
    /// The strategy that produced this decision.
    pub policy: Policy,
    /// The selected choice (always a member of the call's candidates).
    pub chosen: C,
    /// The candidates that were eligible for the final pick.
    pub eligible: Vec<C>,
    /// Audit notes describing why this choice happened.
    pub notes: Vec<DecisionNote<C>>,
}

impl<C> Decision<C> {
    /// Whether the final pick was exploration of an untried choice.
    pub fn explored(&self) -> bool {
        self.notes
            .iter()
            .any(|n| matches!(n, DecisionNote::ExploreFirst))
    }

    /// The shortlist, if the policy applied one.
    pub fn shortlist(&self) -> Option<&[C]> {
        self.notes.iter().find_map(|n| match n {
            DecisionNote::Shortlist { retained, .. } => Some(retained.as_slice()),
            _ => None,
        })
    }
}
