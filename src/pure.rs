//! Pure exploitation over a velocity shortlist.
//!
//! Same ranking and top-`k` retention as [`crate::BestKVelocity`], but the final
//! pick is simply the highest-velocity shortlist member. There is no
//! exploration: a candidate without a velocity (fewer than two observations in
//! its window) ranks at negative infinity instead of being tried first.

use tracing::{debug, trace};

use crate::decision::{Decision, DecisionNote, Policy};
use crate::error::{Error, Result};
use crate::history::{recent, velocity, Choice, ScoreHistory};
use crate::selector::{check_k, check_velocity_window, prepare_candidates, rank_by, Selector};
use crate::tiebreak::TieBreak;

/// Argmax-velocity pick within the top `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PureBestKVelocity {
    k: usize,
    window: Option<usize>,
    tie_break: TieBreak,
}

impl PureBestKVelocity {
    /// Velocity over full histories. Fails when `k == 0`.
    pub fn new(k: usize) -> Result<Self> {
        Ok(Self {
            k: check_k("k", k)?,
            window: None,
            tie_break: TieBreak::default(),
        })
    }

    /// Rank over only the last `window` observations. Fails when `window < 2`.
    pub fn with_window(mut self, window: usize) -> Result<Self> {
        self.window = Some(check_velocity_window(window)?);
        Ok(self)
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Shortlist size.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn window(&self) -> Option<usize> {
        self.window
    }
}

impl<C: Choice> Selector<C> for PureBestKVelocity {
    fn policy(&self) -> Policy {
        Policy::PureBestKVelocity
    }

    fn reward(&self, scores: &[f64]) -> f64 {
        let xs = match self.window {
            Some(w) => recent(scores, w),
            None => scores,
        };
        velocity(xs).unwrap_or(f64::NEG_INFINITY)
    }

    fn decide(&self, candidates: &[C], history: &ScoreHistory<C>) -> Result<Decision<C>> {
        let eligible = prepare_candidates(candidates, history)?;
        let ranked = rank_by(&eligible, history, |xs| {
            <Self as Selector<C>>::reward(self, xs)
        });
        for r in &ranked {
            trace!(policy = %Policy::PureBestKVelocity, choice = %r.choice, velocity = r.score, "ranking score");
        }
        let top = self.tie_break.top_k(&ranked, self.k);
        // Rank order: the first shortlist entry is the argmax.
        let best = top
            .first()
            .copied()
            .ok_or_else(|| Error::invalid("candidate set is empty"))?;
        let chosen = best.choice.clone();
        let best_score = best.score;
        let retained: Vec<C> = top.iter().map(|r| r.choice.clone()).collect();
        debug!(
            policy = %Policy::PureBestKVelocity,
            chosen = %chosen,
            velocity = best_score,
            retained = retained.len(),
            "selected"
        );
        Ok(Decision {
            policy: Policy::PureBestKVelocity,
            chosen,
            eligible,
            notes: vec![
                DecisionNote::Shortlist {
                    k: self.k,
                    retained,
                },
                DecisionNote::DeterministicChoice { score: best_score },
            ],
        })
    }
}
