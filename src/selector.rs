//! The `Selector` trait shared by every strategy.
//!
//! A selector is a pure function of `(candidates, history)` plus its own
//! immutable configuration. It never mutates the history and keeps no state
//! between calls, so one instance can serve concurrent drivers.
//!
//! Strategies differ in two places:
//! - [`Selector::reward`]: the per-choice summary statistic (mean, windowed
//!   mean, velocity, ...), which also backs [`Selector::compute_rewards`].
//! - [`Selector::decide`]: how the statistic turns into one choice.

use std::collections::{BTreeMap, BTreeSet};

use crate::decision::{Decision, Policy};
use crate::error::{Error, Result};
use crate::history::{mean, Choice, ScoreHistory, MIN_VELOCITY_WINDOW, UNTRIED_REWARD};
use crate::tiebreak::Ranked;

/// Common interface for arm-selection strategies.
///
/// # Example
///
/// ```rust
/// use banditsel::{ScoreHistory, Selector, Ucb1};
///
/// fn next<S: Selector<String>>(s: &S, arms: &[String], h: &ScoreHistory<String>) -> String {
///     s.select(arms, h).expect("non-empty, finite inputs")
/// }
///
/// let arms = vec!["grid".to_string(), "gp".to_string()];
/// let mut h = ScoreHistory::new();
/// h.record("grid".to_string(), 0.4);
/// assert_eq!(next(&Ucb1::default(), &arms, &h), "gp");
/// ```
pub trait Selector<C: Choice>: Send + Sync {
    /// Which strategy this is.
    fn policy(&self) -> Policy;

    /// Pick one of `candidates` and explain why.
    ///
    /// Fails with [`Error::InvalidInput`] if `candidates` is empty or any
    /// candidate's history holds a non-finite score.
    fn decide(&self, candidates: &[C], history: &ScoreHistory<C>) -> Result<Decision<C>>;

    /// Pick one of `candidates`.
    fn select(&self, candidates: &[C], history: &ScoreHistory<C>) -> Result<C> {
        self.decide(candidates, history).map(|d| d.chosen)
    }

    /// Per-choice summary statistic over one history entry.
    ///
    /// Default: arithmetic mean, [`UNTRIED_REWARD`] when empty.
    fn reward(&self, scores: &[f64]) -> f64 {
        mean(scores).unwrap_or(UNTRIED_REWARD)
    }

    /// [`Selector::reward`] for every entry of `history`.
    fn compute_rewards(&self, history: &ScoreHistory<C>) -> Result<BTreeMap<C, f64>> {
        history.validate()?;
        Ok(history
            .iter()
            .map(|(c, xs)| (c.clone(), self.reward(xs)))
            .collect())
    }
}

impl<C: Choice, S: Selector<C> + ?Sized> Selector<C> for Box<S> {
    fn policy(&self) -> Policy {
        (**self).policy()
    }
    fn decide(&self, candidates: &[C], history: &ScoreHistory<C>) -> Result<Decision<C>> {
        (**self).decide(candidates, history)
    }
    fn reward(&self, scores: &[f64]) -> f64 {
        (**self).reward(scores)
    }
}

/// Validate a call's inputs and collapse duplicate candidates.
///
/// Order of first occurrence is kept.
pub(crate) fn prepare_candidates<C: Choice>(
    candidates: &[C],
    history: &ScoreHistory<C>,
) -> Result<Vec<C>> {
    if candidates.is_empty() {
        return Err(Error::invalid("candidate set is empty"));
    }
    let mut seen: BTreeSet<&C> = BTreeSet::new();
    let mut out = Vec::with_capacity(candidates.len());
    for c in candidates {
        if seen.insert(c) {
            history.validate_choice(c)?;
            out.push(c.clone());
        }
    }
    Ok(out)
}

/// Score every candidate with `score`, keeping candidate positions.
pub(crate) fn rank_by<'a, C: Choice>(
    candidates: &'a [C],
    history: &ScoreHistory<C>,
    score: impl Fn(&[f64]) -> f64,
) -> Vec<Ranked<'a, C>> {
    candidates
        .iter()
        .enumerate()
        .map(|(index, choice)| Ranked {
            choice,
            index,
            score: score(history.scores(choice)),
        })
        .collect()
}

pub(crate) fn check_k(name: &str, k: usize) -> Result<usize> {
    if k == 0 {
        Err(Error::invalid(format!("{name} must be at least 1")))
    } else {
        Ok(k)
    }
}

/// Velocity windows must hold at least [`MIN_VELOCITY_WINDOW`] observations.
pub(crate) fn check_velocity_window(window: usize) -> Result<usize> {
    if window < MIN_VELOCITY_WINDOW {
        Err(Error::invalid(format!(
            "velocity window must be at least {MIN_VELOCITY_WINDOW} (got {window})"
        )))
    } else {
        Ok(window)
    }
}
