//! Declarative selector configuration.
//!
//! [`SelectorConfig`] names a strategy and its parameters; [`SelectorConfig::build`]
//! validates them and returns a boxed [`Selector`]. With the `serde` feature the
//! configs (de)serialize as internally tagged objects, e.g.
//! `{"policy": "best_k_reward", "k": 3}`.

use std::collections::BTreeMap;

use crate::best::{BestKReward, BestKVelocity, Fallback};
use crate::decision::Policy;
use crate::error::{Error, Result};
use crate::hierarchical::{GroupAggregate, HierarchicalByAlgorithm};
use crate::history::Choice;
use crate::pure::PureBestKVelocity;
use crate::recent::{RecentKReward, RecentKVelocity};
use crate::selector::Selector;
use crate::tiebreak::TieBreak;
use crate::ucb1::Ucb1;
use crate::uniform::Uniform;

/// Parameters for the shortlist families.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShortlistConfig {
    /// Shortlist size (>= 1).
    pub k: usize,
    /// Ranking window. Recent-K: defaults to `k` (at least 2 for velocity).
    /// Pure: defaults to the full history. Best-K: must be unset.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub window: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tie_break: TieBreak,
    /// Pick among a fully tried shortlist. Defaults to UCB1; must be unset
    /// for the pure strategy.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub fallback: Option<Fallback>,
}

impl ShortlistConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            window: None,
            tie_break: TieBreak::default(),
            fallback: None,
        }
    }
}

/// A strategy and its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "policy", rename_all = "snake_case"))]
pub enum SelectorConfig {
    Uniform(Uniform),
    Ucb1(Ucb1),
    BestKReward(ShortlistConfig),
    BestKVelocity(ShortlistConfig),
    RecentKReward(ShortlistConfig),
    RecentKVelocity(ShortlistConfig),
    PureBestKVelocity(ShortlistConfig),
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig::Ucb1(Ucb1::default())
    }
}

impl SelectorConfig {
    pub fn policy(&self) -> Policy {
        match self {
            SelectorConfig::Uniform(_) => Policy::Uniform,
            SelectorConfig::Ucb1(_) => Policy::Ucb1,
            SelectorConfig::BestKReward(_) => Policy::BestKReward,
            SelectorConfig::BestKVelocity(_) => Policy::BestKVelocity,
            SelectorConfig::RecentKReward(_) => Policy::RecentKReward,
            SelectorConfig::RecentKVelocity(_) => Policy::RecentKVelocity,
            SelectorConfig::PureBestKVelocity(_) => Policy::PureBestKVelocity,
        }
    }

    /// Validate and instantiate.
    pub fn build<C: Choice>(&self) -> Result<Box<dyn Selector<C>>> {
        let policy = self.policy();
        let no_window = |c: &ShortlistConfig| -> Result<()> {
            match c.window {
                Some(_) => Err(Error::invalid(format!(
                    "{policy} ranks over full histories; `window` is not supported"
                ))),
                None => Ok(()),
            }
        };
        let selector: Box<dyn Selector<C>> = match *self {
            SelectorConfig::Uniform(u) => Box::new(u),
            SelectorConfig::Ucb1(u) => {
                u.check()?;
                Box::new(u)
            }
            SelectorConfig::BestKReward(c) => {
                no_window(&c)?;
                Box::new(
                    BestKReward::new(c.k)?
                        .with_tie_break(c.tie_break)
                        .with_fallback(c.fallback.unwrap_or_default()),
                )
            }
            SelectorConfig::BestKVelocity(c) => {
                no_window(&c)?;
                Box::new(
                    BestKVelocity::new(c.k)?
                        .with_tie_break(c.tie_break)
                        .with_fallback(c.fallback.unwrap_or_default()),
                )
            }
            SelectorConfig::RecentKReward(c) => {
                let s = RecentKReward::new(c.k)?
                    .with_tie_break(c.tie_break)
                    .with_fallback(c.fallback.unwrap_or_default());
                Box::new(match c.window {
                    Some(w) => s.with_window(w)?,
                    None => s,
                })
            }
            SelectorConfig::RecentKVelocity(c) => {
                let s = RecentKVelocity::new(c.k)?
                    .with_tie_break(c.tie_break)
                    .with_fallback(c.fallback.unwrap_or_default());
                Box::new(match c.window {
                    Some(w) => s.with_window(w)?,
                    None => s,
                })
            }
            SelectorConfig::PureBestKVelocity(c) => {
                if c.fallback.is_some() {
                    return Err(Error::invalid(format!(
                        "{policy} picks the argmax directly; `fallback` is not supported"
                    )));
                }
                let s = PureBestKVelocity::new(c.k)?.with_tie_break(c.tie_break);
                Box::new(match c.window {
                    Some(w) => s.with_window(w)?,
                    None => s,
                })
            }
        };
        Ok(selector)
    }
}

/// Configuration for [`HierarchicalByAlgorithm`]; the group map is supplied
/// at build time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HierarchicalConfig {
    /// Selector over groups.
    pub stage1: SelectorConfig,
    /// Selector over the chosen group's members.
    pub stage2: SelectorConfig,
    pub aggregate: GroupAggregate,
}

impl HierarchicalConfig {
    pub fn build<C: Choice + Send + Sync, G: Choice + Send + Sync>(
        &self,
        groups: BTreeMap<G, Vec<C>>,
    ) -> Result<HierarchicalByAlgorithm<C, G>> {
        Ok(HierarchicalByAlgorithm::new(groups)
            .with_stages(self.stage1.build()?, self.stage2.build()?)
            .with_aggregate(self.aggregate))
    }
}
