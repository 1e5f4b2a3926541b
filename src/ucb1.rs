//! UCB1: mean reward plus a visit-count confidence bonus.
//!
//! `score(c) = mean(c) + exploration_c * sqrt(ln(N) / n_c)`, where `n_c` is the
//! number of observations for `c` and `N` the total over all candidates in the
//! call. With the default `exploration_c = sqrt(2)` this is the textbook
//! `mean + sqrt(2 ln N / n_c)`.
//!
//! A candidate with `n_c == 0` has infinite priority, so every arm is tried
//! once before any is exploited.

use tracing::{debug, trace};

use crate::decision::{Decision, DecisionNote, Policy};
use crate::error::{Error, Result};
use crate::history::{mean, Choice, ScoreHistory};
use crate::selector::{prepare_candidates, Selector};
use crate::tiebreak::{Ranked, TieBreak};

/// UCB1 configuration (the selector is its own config).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Ucb1 {
    /// Exploration coefficient; must be finite and `>= 0`.
    pub exploration_c: f64,
    /// Resolution of equal scores (including several untried candidates).
    pub tie_break: TieBreak,
}

impl Default for Ucb1 {
    fn default() -> Self {
        Self {
            exploration_c: std::f64::consts::SQRT_2,
            tie_break: TieBreak::default(),
        }
    }
}

/// One arm as UCB1 sees it: an exploitation estimate and a visit count.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Arm<'a, C> {
    pub choice: &'a C,
    pub index: usize,
    pub mean: f64,
    pub pulls: usize,
}

/// Outcome of a UCB1 pick over a slice of [`Arm`]s.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pick {
    pub index: usize,
    pub score: f64,
    pub explored: bool,
}

impl Ucb1 {
    /// UCB1 with `exploration_c = sqrt(2)` and lexicographic ties.
    pub fn new() -> Self {
        Self::default()
    }

    /// UCB1 with a custom exploration coefficient.
    pub fn with_exploration(exploration_c: f64) -> Result<Self> {
        let u = Self {
            exploration_c,
            ..Self::default()
        };
        u.check()?;
        Ok(u)
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.exploration_c.is_finite() && self.exploration_c >= 0.0 {
            Ok(())
        } else {
            Err(Error::invalid(format!(
                "exploration_c must be finite and >= 0 (got {})",
                self.exploration_c
            )))
        }
    }

    /// The confidence bonus for an arm with `pulls` out of `total` observations.
    pub fn bonus(&self, pulls: usize, total: usize) -> f64 {
        if pulls == 0 {
            return f64::INFINITY;
        }
        let ln_n = (total.max(1) as f64).ln();
        self.exploration_c * (ln_n / pulls as f64).sqrt()
    }

    /// Pick among `arms` (non-empty). Arms with no pulls are untried and win
    /// outright; a tried arm's score is clamped to the finite range.
    pub(crate) fn pick<C: Choice>(&self, arms: &[Arm<'_, C>]) -> Option<Pick> {
        let total: usize = arms.iter().map(|a| a.pulls).sum();
        let scored: Vec<Ranked<'_, C>> = arms
            .iter()
            .map(|a| {
                let score = if a.pulls == 0 {
                    f64::INFINITY
                } else {
                    (a.mean + self.bonus(a.pulls, total)).clamp(f64::MIN, f64::MAX)
                };
                trace!(choice = %a.choice, mean = a.mean, pulls = a.pulls, score, "ucb1 score");
                Ranked {
                    choice: a.choice,
                    index: a.index,
                    score,
                }
            })
            .collect();
        let i = self.tie_break.argmax(&scored)?;
        Some(Pick {
            index: i,
            score: scored[i].score,
            explored: arms[i].pulls == 0,
        })
    }
}

impl<C: Choice> Selector<C> for Ucb1 {
    fn policy(&self) -> Policy {
        Policy::Ucb1
    }

    fn decide(&self, candidates: &[C], history: &ScoreHistory<C>) -> Result<Decision<C>> {
        self.check()?;
        let eligible = prepare_candidates(candidates, history)?;
        let arms: Vec<Arm<'_, C>> = eligible
            .iter()
            .enumerate()
            .map(|(index, choice)| {
                let xs = history.scores(choice);
                Arm {
                    choice,
                    index,
                    mean: mean(xs).unwrap_or(0.0),
                    pulls: xs.len(),
                }
            })
            .collect();
        let pick = self
            .pick(&arms)
            .ok_or_else(|| Error::invalid("candidate set is empty"))?;
        let chosen = arms[pick.index].choice.clone();
        debug!(
            policy = %Policy::Ucb1,
            chosen = %chosen,
            explored = pick.explored,
            eligible = eligible.len(),
            "selected"
        );
        let note = if pick.explored {
            DecisionNote::ExploreFirst
        } else {
            DecisionNote::DeterministicChoice { score: pick.score }
        };
        Ok(Decision {
            policy: Policy::Ucb1,
            chosen,
            eligible,
            notes: vec![note],
        })
    }
}
