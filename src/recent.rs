//! Recent-K strategies: like Best-K, but ranking only looks at each
//! candidate's most recent observations.
//!
//! The ranking window defaults to `k` and can be set separately with
//! `with_window`. A candidate with fewer observations than the window uses
//! all it has. Forgetting older scores lets the shortlist follow algorithms
//! whose usefulness changes as the search space gets explored.

use crate::best::{shortlist_builders, Fallback, Shortlist};
use crate::decision::{Decision, Policy};
use crate::error::Result;
use crate::history::{
    mean, recent, velocity, Choice, ScoreHistory, MIN_VELOCITY_WINDOW, UNTRIED_REWARD,
};
use crate::selector::{check_k, check_velocity_window, Selector};
use crate::tiebreak::TieBreak;

/// Top-`k` by mean of the last `window` observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentKReward {
    pub(crate) shortlist: Shortlist,
    window: usize,
}

impl RecentKReward {
    /// Shortlist size and window both `k`. Fails when `k == 0`.
    pub fn new(k: usize) -> Result<Self> {
        Ok(Self {
            shortlist: Shortlist::new(k)?,
            window: k,
        })
    }

    /// Override the ranking window. Fails when `window == 0`.
    pub fn with_window(mut self, window: usize) -> Result<Self> {
        self.window = check_k("window", window)?;
        Ok(self)
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

shortlist_builders!(RecentKReward);

impl<C: Choice> Selector<C> for RecentKReward {
    fn policy(&self) -> Policy {
        Policy::RecentKReward
    }

    fn reward(&self, scores: &[f64]) -> f64 {
        mean(recent(scores, self.window)).unwrap_or(UNTRIED_REWARD)
    }

    fn decide(&self, candidates: &[C], history: &ScoreHistory<C>) -> Result<Decision<C>> {
        self.shortlist.decide(
            Policy::RecentKReward,
            candidates,
            history,
            |xs| mean(recent(xs, self.window)),
            |xs| recent(xs, self.window).len(),
        )
    }
}

/// Top-`k` by velocity over the last `window` observations.
///
/// Velocity needs two points, so the window is at least 2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentKVelocity {
    pub(crate) shortlist: Shortlist,
    window: usize,
}

impl RecentKVelocity {
    /// Shortlist size `k`, window `max(k, 2)`. Fails when `k == 0`.
    pub fn new(k: usize) -> Result<Self> {
        Ok(Self {
            shortlist: Shortlist::new(k)?,
            window: k.max(MIN_VELOCITY_WINDOW),
        })
    }

    /// Override the ranking window. Fails when `window < 2`.
    pub fn with_window(mut self, window: usize) -> Result<Self> {
        self.window = check_velocity_window(window)?;
        Ok(self)
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

shortlist_builders!(RecentKVelocity);

impl<C: Choice> Selector<C> for RecentKVelocity {
    fn policy(&self) -> Policy {
        Policy::RecentKVelocity
    }

    fn reward(&self, scores: &[f64]) -> f64 {
        velocity(recent(scores, self.window)).unwrap_or(UNTRIED_REWARD)
    }

    fn decide(&self, candidates: &[C], history: &ScoreHistory<C>) -> Result<Decision<C>> {
        self.shortlist.decide(
            Policy::RecentKVelocity,
            candidates,
            history,
            |xs| velocity(recent(xs, self.window)),
            |xs| recent(xs, self.window).len(),
        )
    }
}
