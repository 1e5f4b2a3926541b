//! `banditsel`: deterministic arm-selection strategies for algorithm and
//! hyperparameter search loops.
//!
//! The setting: a search driver has a handful of candidate "choices" (tuning
//! algorithms, configuration classes, model families) and, for each, a
//! chronological list of reward scores from trials it already ran. Each round
//! it asks a selector which choice to try next, runs the trial, appends the
//! score to that choice's [`ScoreHistory`], and repeats.
//!
//! **Goals:**
//! - **Pure**: a selector is a function of `(candidates, history)` and its own
//!   immutable configuration. No hidden state; safe to share across threads.
//! - **Deterministic**: same history + same seed → same choice. Ties follow an
//!   explicit [`TieBreak`] rule.
//! - **Untried first**: an empty history ranks at [`UNTRIED_REWARD`] (`+inf`)
//!   so every exploring strategy tries a new choice before exploiting.
//!
//! **Strategies** (all implement [`Selector`]):
//! - [`Uniform`]: seeded uniform baseline; ignores scores.
//! - [`Ucb1`]: `mean + c * sqrt(ln N / n)`.
//! - [`BestKReward`] / [`BestKVelocity`]: top-`k` shortlist by mean reward or
//!   velocity, then UCB1 (or uniform) within the shortlist.
//! - [`RecentKReward`] / [`RecentKVelocity`]: same, ranked over each choice's
//!   most recent observations only.
//! - [`PureBestKVelocity`]: velocity shortlist, argmax pick, no exploration.
//! - [`HierarchicalByAlgorithm`]: pick an algorithm group, then a member.
//!
//! Velocity is the mean of successive differences of a score sequence,
//! `(last - first) / (n - 1)`; see [`velocity`].
//!
//! **Non-goals:** computing scores, running or scheduling trials, persisting
//! histories.
//!
//! # Example
//!
//! ```rust
//! use banditsel::{BestKReward, ScoreHistory, Selector, Ucb1};
//!
//! let arms = ["A", "B", "C"];
//! let mut h = ScoreHistory::new();
//! for x in [1.0, 1.0, 1.0] {
//!     h.record("A", x);
//! }
//! h.record("C", 5.0);
//!
//! // B has never been tried.
//! assert_eq!(Ucb1::default().select(&arms, &h).unwrap(), "B");
//!
//! h.record("B", 0.0);
//! let best1 = BestKReward::new(1).unwrap();
//! assert_eq!(best1.select(&arms, &h).unwrap(), "C");
//! ```
//!
//! # Logging
//!
//! Every decision emits a `tracing` event at `debug` level (policy, chosen
//! choice, shortlist size); per-candidate scores are emitted at `trace`. The
//! crate installs no subscriber.

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod history;
pub use history::*;

mod tiebreak;
pub use tiebreak::{stable_hash64, TieBreak, TIEBREAK_EPS};

mod decision;
pub use decision::*;

mod selector;
pub use selector::Selector;

mod uniform;
pub use uniform::*;

mod ucb1;
pub use ucb1::Ucb1;

mod best;
pub use best::{BestKReward, BestKVelocity, Fallback};

mod recent;
pub use recent::*;

mod pure;
pub use pure::*;

mod hierarchical;
pub use hierarchical::*;

mod config;
pub use config::*;
