//! Uniform random baseline.
//!
//! Ignores scores entirely. Useful as a cold-start policy or as a control
//! group to compare adaptive strategies against.
//!
//! The selector stays a pure function of its inputs: each call seeds a fresh
//! `StdRng` from `seed` mixed with the round number (total observations over
//! the candidates). Same seed and same history give the same pick; successive
//! rounds draw differently.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::decision::{Decision, DecisionNote, Policy};
use crate::error::{Error, Result};
use crate::history::{Choice, ScoreHistory};
use crate::selector::{prepare_candidates, Selector};
use crate::tiebreak::splitmix64;

/// Seedable uniform selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Uniform {
    /// Base seed; the round number is mixed in per call.
    pub seed: u64,
}

impl Uniform {
    /// Uniform selector with seed 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniform selector with an explicit base seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// The RNG used for the draw in `round`.
    pub fn rng_for_round(&self, round: u64) -> StdRng {
        StdRng::seed_from_u64(splitmix64(self.seed ^ splitmix64(round)))
    }

    /// Pick uniformly from `candidates` with a caller-supplied RNG.
    ///
    /// Ignores `seed`; the caller owns reproducibility.
    pub fn select_with_rng<C: Choice, R: Rng + ?Sized>(
        &self,
        candidates: &[C],
        rng: &mut R,
    ) -> Result<C> {
        if candidates.is_empty() {
            return Err(Error::invalid("candidate set is empty"));
        }
        Ok(candidates[rng.random_range(0..candidates.len())].clone())
    }

    /// Index into `items` for `round`. `items` must be non-empty.
    pub(crate) fn draw_index(&self, len: usize, round: u64) -> usize {
        self.rng_for_round(round).random_range(0..len)
    }
}

impl<C: Choice> Selector<C> for Uniform {
    fn policy(&self) -> Policy {
        Policy::Uniform
    }

    fn decide(&self, candidates: &[C], history: &ScoreHistory<C>) -> Result<Decision<C>> {
        let eligible = prepare_candidates(candidates, history)?;
        let round = history.total_observations(&eligible) as u64;
        let chosen = eligible[self.draw_index(eligible.len(), round)].clone();
        debug!(policy = %Policy::Uniform, chosen = %chosen, round, eligible = eligible.len(), "selected");
        Ok(Decision {
            policy: Policy::Uniform,
            chosen,
            eligible,
            notes: vec![DecisionNote::SampledUniform { round }],
        })
    }
}
