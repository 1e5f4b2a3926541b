//! Deterministic tie-breaking and ranking helpers shared by every selector.
//!
//! Scores closer than [`TIEBREAK_EPS`] are ties. Ties are resolved by a
//! [`TieBreak`] rule, never by iteration order of a hash map, so the same
//! inputs always give the same choice.
//!
//! The seeded rule uses a stable non-cryptographic hash; it exists for
//! repeatable "shuffled" tie-breaks, not for security.

use std::cmp::Ordering;

use crate::history::Choice;

/// Epsilon used for floating-point tie detection in selection scoring.
pub const TIEBREAK_EPS: f64 = 1e-12;

/// How equal-scoring choices are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "rule", content = "seed", rename_all = "snake_case"))]
pub enum TieBreak {
    /// Smallest choice (by `Ord`) wins.
    #[default]
    Lexicographic,
    /// Earliest position in the candidate slice wins.
    CandidateOrder,
    /// Smallest `stable_hash64(seed, choice.to_string())` wins; lexicographic on collision.
    Seeded(u64),
}

impl TieBreak {
    /// `Less` means `a` is preferred over `b`.
    pub(crate) fn order<C: Choice>(&self, a: &Ranked<'_, C>, b: &Ranked<'_, C>) -> Ordering {
        match *self {
            TieBreak::Lexicographic => a.choice.cmp(b.choice),
            TieBreak::CandidateOrder => a.index.cmp(&b.index),
            TieBreak::Seeded(seed) => {
                let ha = stable_hash64(seed, &a.choice.to_string());
                let hb = stable_hash64(seed, &b.choice.to_string());
                ha.cmp(&hb).then_with(|| a.choice.cmp(b.choice))
            }
        }
    }

    /// Index (into `items`) of the highest-scoring entry, ties resolved by `self`.
    pub(crate) fn argmax<C: Choice>(&self, items: &[Ranked<'_, C>]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, it) in items.iter().enumerate() {
            let Some(b) = best else {
                best = Some(i);
                continue;
            };
            let cur = &items[b];
            let better = match score_cmp(it.score, cur.score) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => self.order(it, cur) == Ordering::Less,
            };
            if better {
                best = Some(i);
            }
        }
        best
    }

    /// The `k` best entries in rank order (highest score first).
    ///
    /// Repeated argmax rather than a sort: epsilon ties are not transitive,
    /// so they cannot back a total order.
    pub(crate) fn top_k<'a, C: Choice>(
        &self,
        items: &[Ranked<'a, C>],
        k: usize,
    ) -> Vec<Ranked<'a, C>> {
        let mut rest: Vec<Ranked<'a, C>> = items.to_vec();
        let mut out = Vec::with_capacity(k.min(rest.len()));
        while out.len() < k {
            let Some(i) = self.argmax(&rest) else {
                break;
            };
            out.push(rest.remove(i));
        }
        out
    }
}

/// A candidate with its position in the call's candidate slice and a score.
#[derive(Debug)]
pub(crate) struct Ranked<'a, C> {
    pub choice: &'a C,
    pub index: usize,
    pub score: f64,
}

impl<C> Clone for Ranked<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Ranked<'_, C> {}

/// Compare two scores with an epsilon band; equal infinities are ties.
pub(crate) fn score_cmp(a: f64, b: f64) -> Ordering {
    if a == b || (a - b).abs() <= TIEBREAK_EPS {
        Ordering::Equal
    } else if a > b {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

/// Deterministic (non-crypto) stable hash used for seeded tie-breaking and
/// seeded uniform draws.
///
/// FNV-1a over the bytes, then a SplitMix64 finalizer.
#[must_use]
pub fn stable_hash64(seed: u64, s: &str) -> u64 {
    let mut h: u64 = 14695981039346656037u64;
    for b in s.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(1099511628211u64);
    }
    splitmix64(seed ^ h)
}

#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
