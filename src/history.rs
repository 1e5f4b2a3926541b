//! Per-choice score histories and the summary statistics computed over them.
//!
//! A [`ScoreHistory`] is owned by the driver. Selectors only ever borrow it,
//! so a snapshot handed to a selector is never mutated during a call.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// An opaque candidate identifier.
///
/// Blanket-implemented for anything that is `Clone + Ord + Display`, which covers
/// `String`, `&str`, and the integer types. `Ord` gives lexicographic tie-breaks;
/// `Display` feeds the seeded tie-break hash.
pub trait Choice: Clone + Ord + fmt::Display {}

impl<T: Clone + Ord + fmt::Display> Choice for T {}

/// Reward assigned to a choice with no usable observations.
///
/// Positive infinity, so untried choices always rank first.
pub const UNTRIED_REWARD: f64 = f64::INFINITY;

/// Chronological score observations per choice.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreHistory<C: Ord> {
    scores: BTreeMap<C, Vec<f64>>,
}

impl<C: Ord> Default for ScoreHistory<C> {
    fn default() -> Self {
        Self {
            scores: BTreeMap::new(),
        }
    }
}

impl<C: Choice> ScoreHistory<C> {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one observation for `choice`.
    pub fn record(&mut self, choice: C, score: f64) {
        self.scores.entry(choice).or_default().push(score);
    }

    /// Register `choice` with no observations (a known, untried choice).
    pub fn ensure(&mut self, choice: C) {
        self.scores.entry(choice).or_default();
    }

    /// Observations for `choice`, oldest first. Unknown choices have none.
    pub fn scores(&self, choice: &C) -> &[f64] {
        self.scores.get(choice).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of observations for `choice`.
    pub fn len_of(&self, choice: &C) -> usize {
        self.scores(choice).len()
    }

    /// Total observations across `candidates` only.
    ///
    /// Entries for choices outside `candidates` are ignored.
    pub fn total_observations(&self, candidates: &[C]) -> usize {
        candidates.iter().map(|c| self.len_of(c)).sum()
    }

    /// Number of distinct choices with an entry (including empty entries).
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True when no choice has an entry.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterate `(choice, observations)` in choice order.
    pub fn iter(&self) -> impl Iterator<Item = (&C, &[f64])> + '_ {
        self.scores.iter().map(|(c, v)| (c, v.as_slice()))
    }

    /// Check that every observation for `choice` is a finite number.
    pub fn validate_choice(&self, choice: &C) -> Result<()> {
        validate_scores(choice, self.scores(choice))
    }

    /// Check every entry.
    pub fn validate(&self) -> Result<()> {
        for (c, xs) in self.iter() {
            validate_scores(c, xs)?;
        }
        Ok(())
    }
}

impl<C: Choice> FromIterator<(C, Vec<f64>)> for ScoreHistory<C> {
    fn from_iter<I: IntoIterator<Item = (C, Vec<f64>)>>(iter: I) -> Self {
        let mut h = Self::new();
        for (c, xs) in iter {
            h.scores.entry(c).or_default().extend(xs);
        }
        h
    }
}

fn validate_scores<C: Choice>(choice: &C, xs: &[f64]) -> Result<()> {
    match xs.iter().position(|x| !x.is_finite()) {
        Some(i) => Err(Error::invalid(format!(
            "score #{i} for choice `{choice}` is not a finite number ({})",
            xs[i]
        ))),
        None => Ok(()),
    }
}

/// Fewest observations a velocity can be computed from.
pub const MIN_VELOCITY_WINDOW: usize = 2;

/// Arithmetic mean, or `None` for an empty slice.
///
/// Finite inputs always give a finite mean, even near `f64::MAX`.
pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    let n = xs.len() as f64;
    let sum: f64 = xs.iter().sum();
    if sum.is_finite() {
        Some(sum / n)
    } else {
        Some(xs.iter().map(|x| x / n).sum())
    }
}

/// Average per-step change: `(last - first) / (n - 1)`.
///
/// This is the mean of successive differences. `None` when fewer than
/// [`MIN_VELOCITY_WINDOW`] observations exist. A change too large for `f64`
/// saturates at `f64::MAX` / `f64::MIN` rather than becoming infinite.
pub fn velocity(xs: &[f64]) -> Option<f64> {
    match xs {
        [first, .., last] => {
            let steps = (xs.len() - 1) as f64;
            let v = (last - first) / steps;
            if v.is_finite() {
                Some(v)
            } else {
                Some((last / steps - first / steps).clamp(f64::MIN, f64::MAX))
            }
        }
        _ => None,
    }
}

/// The last `window` observations (all of them if there are fewer).
pub fn recent(xs: &[f64], window: usize) -> &[f64] {
    &xs[xs.len().saturating_sub(window)..]
}
