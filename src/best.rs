//! Best-K strategies: shortlist the top `k` candidates by a ranking score, then
//! explore within the shortlist.
//!
//! - [`BestKReward`] ranks by mean reward over the full history.
//! - [`BestKVelocity`] ranks by velocity (see [`crate::velocity`]) over the full history.
//!
//! Within the shortlist, an untried candidate (ranking score
//! [`UNTRIED_REWARD`]) is picked first; otherwise the [`Fallback`] policy
//! decides. Candidates outside the shortlist are never chosen in that call.
//! Boundary ties at rank `k` follow the configured [`TieBreak`].
//!
//! The recent-window variants in [`crate::recent`] reuse the same machinery.

use tracing::{debug, trace};

use crate::decision::{Decision, DecisionNote, Policy};
use crate::error::Result;
use crate::history::{mean, velocity, Choice, ScoreHistory, UNTRIED_REWARD};
use crate::selector::{check_k, prepare_candidates, rank_by, Selector};
use crate::tiebreak::{Ranked, TieBreak};
use crate::ucb1::{Arm, Ucb1};
use crate::uniform::Uniform;

/// How the final pick is made among a shortlist with no untried member.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "policy", rename_all = "snake_case"))]
pub enum Fallback {
    /// UCB1 with the ranking score as the exploitation term.
    Ucb1(Ucb1),
    /// Seeded uniform draw.
    Uniform(Uniform),
}

impl Default for Fallback {
    fn default() -> Self {
        Fallback::Ucb1(Ucb1::default())
    }
}

/// Shortlist parameters shared by the Best-K and Recent-K families.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Shortlist {
    pub k: usize,
    pub tie_break: TieBreak,
    pub fallback: Fallback,
}

impl Shortlist {
    pub(crate) fn new(k: usize) -> Result<Self> {
        Ok(Self {
            k: check_k("k", k)?,
            tie_break: TieBreak::default(),
            fallback: Fallback::default(),
        })
    }

    /// Rank, shortlist, then pick.
    ///
    /// `rank` maps a full history entry to its ranking score, or `None` when
    /// the entry has too few observations to rank (untried). `pulls` gives the
    /// number of observations that score was computed from.
    pub(crate) fn decide<C: Choice>(
        &self,
        policy: Policy,
        candidates: &[C],
        history: &ScoreHistory<C>,
        rank: impl Fn(&[f64]) -> Option<f64>,
        pulls: impl Fn(&[f64]) -> usize,
    ) -> Result<Decision<C>> {
        if let Fallback::Ucb1(u) = &self.fallback {
            u.check()?;
        }
        let eligible = prepare_candidates(candidates, history)?;
        let untried_flags: Vec<bool> = eligible
            .iter()
            .map(|c| rank(history.scores(c)).is_none())
            .collect();
        let ranked = rank_by(&eligible, history, |xs| rank(xs).unwrap_or(UNTRIED_REWARD));
        for r in &ranked {
            trace!(%policy, choice = %r.choice, score = r.score, "ranking score");
        }
        let top = self.tie_break.top_k(&ranked, self.k);
        let retained: Vec<C> = top.iter().map(|r| r.choice.clone()).collect();

        let untried: Vec<Ranked<'_, C>> = top
            .iter()
            .copied()
            .filter(|r| untried_flags[r.index])
            .collect();

        let (chosen, note) = if let Some(i) = self.tie_break.argmax(&untried) {
            (untried[i].choice.clone(), DecisionNote::ExploreFirst)
        } else {
            match &self.fallback {
                Fallback::Ucb1(u) => {
                    let arms: Vec<Arm<'_, C>> = top
                        .iter()
                        .map(|r| Arm {
                            choice: r.choice,
                            index: r.index,
                            mean: r.score,
                            pulls: pulls(history.scores(r.choice)),
                        })
                        .collect();
                    // `top` is non-empty: `eligible` is, and k >= 1.
                    let pick = u.pick(&arms).unwrap_or(crate::ucb1::Pick {
                        index: 0,
                        score: top[0].score,
                        explored: false,
                    });
                    let note = if pick.explored {
                        DecisionNote::ExploreFirst
                    } else {
                        DecisionNote::DeterministicChoice { score: pick.score }
                    };
                    (arms[pick.index].choice.clone(), note)
                }
                Fallback::Uniform(u) => {
                    let round = history.total_observations(&retained) as u64;
                    let i = u.draw_index(top.len(), round);
                    (top[i].choice.clone(), DecisionNote::SampledUniform { round })
                }
            }
        };

        debug!(
            %policy,
            chosen = %chosen,
            k = self.k,
            retained = retained.len(),
            eligible = eligible.len(),
            "selected"
        );
        Ok(Decision {
            policy,
            chosen,
            eligible,
            notes: vec![
                DecisionNote::Shortlist {
                    k: self.k,
                    retained,
                },
                note,
            ],
        })
    }
}

macro_rules! shortlist_builders {
    ($ty:ty) => {
        impl $ty {
            /// Shortlist size.
            pub fn k(&self) -> usize {
                self.shortlist.k
            }

            /// Tie-break for ranking boundaries and untried picks.
            pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
                self.shortlist.tie_break = tie_break;
                self
            }

            /// Policy used among a fully-tried shortlist.
            pub fn with_fallback(mut self, fallback: Fallback) -> Self {
                self.shortlist.fallback = fallback;
                self
            }
        }
    };
}
pub(crate) use shortlist_builders;

/// Top-`k` by mean reward over all observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestKReward {
    pub(crate) shortlist: Shortlist,
}

impl BestKReward {
    /// Fails with `InvalidInput` when `k == 0`.
    pub fn new(k: usize) -> Result<Self> {
        Ok(Self {
            shortlist: Shortlist::new(k)?,
        })
    }
}

shortlist_builders!(BestKReward);

impl<C: Choice> Selector<C> for BestKReward {
    fn policy(&self) -> Policy {
        Policy::BestKReward
    }

    fn reward(&self, scores: &[f64]) -> f64 {
        mean(scores).unwrap_or(UNTRIED_REWARD)
    }

    fn decide(&self, candidates: &[C], history: &ScoreHistory<C>) -> Result<Decision<C>> {
        self.shortlist.decide(
            Policy::BestKReward,
            candidates,
            history,
            mean,
            |xs| xs.len(),
        )
    }
}

/// Top-`k` by velocity over all observations.
///
/// Candidates with fewer than two observations have no velocity yet and rank
/// as untried, so they are re-tried until a trend exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestKVelocity {
    pub(crate) shortlist: Shortlist,
}

impl BestKVelocity {
    /// Fails with `InvalidInput` when `k == 0`.
    pub fn new(k: usize) -> Result<Self> {
        Ok(Self {
            shortlist: Shortlist::new(k)?,
        })
    }
}

shortlist_builders!(BestKVelocity);

impl<C: Choice> Selector<C> for BestKVelocity {
    fn policy(&self) -> Policy {
        Policy::BestKVelocity
    }

    fn reward(&self, scores: &[f64]) -> f64 {
        velocity(scores).unwrap_or(UNTRIED_REWARD)
    }

    fn decide(&self, candidates: &[C], history: &ScoreHistory<C>) -> Result<Decision<C>> {
        self.shortlist.decide(
            Policy::BestKVelocity,
            candidates,
            history,
            velocity,
            |xs| xs.len(),
        )
    }
}
