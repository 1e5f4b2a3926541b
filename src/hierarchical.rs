//! Two-stage selection: pick an algorithm group, then a member of it.
//!
//! Choices are partitioned by group key (typically the tuning algorithm a
//! configuration belongs to). Stage 1 runs a selector over groups, using a
//! group-level history built by [`GroupAggregate`]. Stage 2 runs a selector
//! over the chosen group's members that appear among the call's candidates.
//!
//! Groups with no member among the candidates are left out of stage 1; if no
//! group has one, the call fails with `InvalidInput`. Candidates that belong
//! to no group are never selected.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::decision::{Decision, DecisionNote, Policy};
use crate::error::{Error, Result};
use crate::history::{mean, Choice, ScoreHistory};
use crate::selector::{prepare_candidates, Selector};
use crate::tiebreak::{Ranked, TieBreak};
use crate::ucb1::Ucb1;

/// How member histories are folded into one group history for stage 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GroupAggregate {
    /// All member observations, concatenated in member order.
    #[default]
    Pooled,
    /// The observations of the member with the highest mean (untried members skipped).
    BestMember,
    /// One observation per tried member: that member's mean.
    MeanOfMembers,
}

impl GroupAggregate {
    fn fold<C: Choice>(&self, members: &[C], history: &ScoreHistory<C>) -> Vec<f64> {
        match self {
            GroupAggregate::Pooled => members
                .iter()
                .flat_map(|m| history.scores(m).iter().copied())
                .collect(),
            GroupAggregate::BestMember => {
                let ranked: Vec<Ranked<'_, C>> = members
                    .iter()
                    .enumerate()
                    .filter_map(|(index, choice)| {
                        mean(history.scores(choice)).map(|score| Ranked {
                            choice,
                            index,
                            score,
                        })
                    })
                    .collect();
                TieBreak::Lexicographic
                    .argmax(&ranked)
                    .map(|i| history.scores(ranked[i].choice).to_vec())
                    .unwrap_or_default()
            }
            GroupAggregate::MeanOfMembers => members
                .iter()
                .filter_map(|m| mean(history.scores(m)))
                .collect(),
        }
    }
}

/// Group-then-member selector with pluggable stages.
pub struct HierarchicalByAlgorithm<C, G> {
    groups: BTreeMap<G, Vec<C>>,
    aggregate: GroupAggregate,
    stage1: Box<dyn Selector<G>>,
    stage2: Box<dyn Selector<C>>,
}

impl<C, G> std::fmt::Debug for HierarchicalByAlgorithm<C, G>
where
    C: Choice + std::fmt::Debug,
    G: Choice + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchicalByAlgorithm")
            .field("groups", &self.groups)
            .field("aggregate", &self.aggregate)
            .field("stage1", &(*self.stage1).policy())
            .field("stage2", &(*self.stage2).policy())
            .finish()
    }
}

impl<C: Choice, G: Choice> HierarchicalByAlgorithm<C, G> {
    /// UCB1 at both stages, pooled group histories.
    pub fn new(groups: BTreeMap<G, Vec<C>>) -> Self {
        Self {
            groups,
            aggregate: GroupAggregate::default(),
            stage1: Box::new(Ucb1::default()),
            stage2: Box::new(Ucb1::default()),
        }
    }

    /// Build the group map from `(choice, group)` pairs.
    pub fn from_membership(pairs: impl IntoIterator<Item = (C, G)>) -> Self {
        let mut groups: BTreeMap<G, Vec<C>> = BTreeMap::new();
        for (c, g) in pairs {
            let members = groups.entry(g).or_default();
            if !members.contains(&c) {
                members.push(c);
            }
        }
        Self::new(groups)
    }

    pub fn with_stages(
        mut self,
        stage1: Box<dyn Selector<G>>,
        stage2: Box<dyn Selector<C>>,
    ) -> Self {
        self.stage1 = stage1;
        self.stage2 = stage2;
        self
    }

    pub fn with_aggregate(mut self, aggregate: GroupAggregate) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn groups(&self) -> &BTreeMap<G, Vec<C>> {
        &self.groups
    }

    /// The group `choice` belongs to, if any (first match in group order).
    pub fn group_of(&self, choice: &C) -> Option<&G> {
        self.groups
            .iter()
            .find(|(_, members)| members.contains(choice))
            .map(|(g, _)| g)
    }

    /// Per-group members present in `candidates` and the stage-1 history.
    fn populated(
        &self,
        candidates: &[C],
        history: &ScoreHistory<C>,
    ) -> (BTreeMap<G, Vec<C>>, ScoreHistory<G>) {
        let present: BTreeSet<&C> = candidates.iter().collect();
        let mut members_by_group = BTreeMap::new();
        let mut group_history = ScoreHistory::new();
        for (g, members) in &self.groups {
            let mut seen: BTreeSet<&C> = BTreeSet::new();
            let members: Vec<C> = members
                .iter()
                .filter(|m| present.contains(m) && seen.insert(*m))
                .cloned()
                .collect();
            if members.is_empty() {
                continue;
            }
            group_history.ensure(g.clone());
            for x in self.aggregate.fold(&members, history) {
                group_history.record(g.clone(), x);
            }
            members_by_group.insert(g.clone(), members);
        }
        (members_by_group, group_history)
    }
}

impl<C, G> Selector<C> for HierarchicalByAlgorithm<C, G>
where
    C: Choice + Send + Sync,
    G: Choice + Send + Sync,
{
    fn policy(&self) -> Policy {
        Policy::HierarchicalByAlgorithm
    }

    fn decide(&self, candidates: &[C], history: &ScoreHistory<C>) -> Result<Decision<C>> {
        let candidates = prepare_candidates(candidates, history)?;
        let (mut members_by_group, group_history) = self.populated(&candidates, history);
        if members_by_group.is_empty() {
            return Err(Error::invalid(
                "no group has a member among the candidates",
            ));
        }
        let group_keys: Vec<G> = members_by_group.keys().cloned().collect();
        let group = self.stage1.select(&group_keys, &group_history)?;
        let members = members_by_group
            .remove(&group)
            .ok_or_else(|| Error::invalid(format!("stage 1 returned unknown group `{group}`")))?;

        let inner = self.stage2.decide(&members, history)?;
        if !members.contains(&inner.chosen) {
            return Err(Error::invalid(format!(
                "stage 2 returned `{}` outside group `{group}`",
                inner.chosen
            )));
        }
        debug!(
            policy = %Policy::HierarchicalByAlgorithm,
            group = %group,
            chosen = %inner.chosen,
            groups = group_keys.len(),
            members = members.len(),
            "selected"
        );
        let mut notes = vec![DecisionNote::GroupChosen {
            group: group.to_string(),
            members: members.clone(),
        }];
        notes.extend(inner.notes);
        Ok(Decision {
            policy: Policy::HierarchicalByAlgorithm,
            chosen: inner.chosen,
            eligible: members,
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BestKReward, Uniform};

    fn groups() -> BTreeMap<&'static str, Vec<&'static str>> {
        BTreeMap::from([("g1", vec!["A", "B"]), ("g2", vec!["C"])])
    }

    fn history(entries: &[(&'static str, &[f64])]) -> ScoreHistory<&'static str> {
        entries.iter().map(|(c, xs)| (*c, xs.to_vec())).collect()
    }

    #[test]
    fn better_group_wins_stage_one() {
        // Pooled: g1 = [5, 5, 4] (n=3), g2 = [1, 1, 1] (n=3): same bonus, g1 has the higher mean.
        let h = history(&[("A", &[5.0, 5.0]), ("B", &[4.0]), ("C", &[1.0, 1.0, 1.0])]);
        let s = HierarchicalByAlgorithm::new(groups());
        let d = s.decide(&["A", "B", "C"], &h).unwrap();
        assert!(d.chosen == "A" || d.chosen == "B", "chose {}", d.chosen);
        assert_eq!(d.eligible, vec!["A", "B"]);
        assert!(matches!(&d.notes[0], DecisionNote::GroupChosen { group, .. } if group == "g1"));
    }

    #[test]
    fn untried_group_is_explored() {
        let h = history(&[("A", &[5.0]), ("B", &[4.0])]);
        let s = HierarchicalByAlgorithm::new(groups());
        assert_eq!(s.select(&["A", "B", "C"], &h).unwrap(), "C");
    }

    #[test]
    fn groups_without_candidates_are_skipped() {
        let h = history(&[("A", &[0.0])]);
        let s = HierarchicalByAlgorithm::new(groups());
        // g2's only member is not a candidate, so only g1 is eligible.
        assert_eq!(s.select(&["A", "B"], &h).unwrap(), "B");
    }

    #[test]
    fn no_populated_group_is_invalid() {
        let h = history(&[]);
        let s = HierarchicalByAlgorithm::new(groups());
        assert!(matches!(s.select(&["Z"], &h), Err(Error::InvalidInput(_))));
        let empty: HierarchicalByAlgorithm<&str, &str> = HierarchicalByAlgorithm::new(BTreeMap::new());
        assert!(empty.select(&["A"], &h).is_err());
    }

    #[test]
    fn ungrouped_candidates_are_never_chosen() {
        let h = history(&[]);
        let s = HierarchicalByAlgorithm::new(groups());
        for _ in 0..3 {
            let c = s.select(&["Z", "A", "B", "C"], &h).unwrap();
            assert_ne!(c, "Z");
        }
    }

    #[test]
    fn pluggable_stages() {
        let h = history(&[
            ("A", &[0.9, 0.9]),
            ("B", &[0.1, 0.1]),
            ("C", &[0.2, 0.2, 0.2, 0.2]),
        ]);
        let s = HierarchicalByAlgorithm::new(groups()).with_stages(
            Box::new(Uniform::with_seed(4)),
            Box::new(BestKReward::new(1).unwrap()),
        );
        let c = s.select(&["A", "B", "C"], &h).unwrap();
        // Whatever group stage 1 draws, the best-1 shortlist of g1 is A.
        assert!(c == "A" || c == "C", "chose {c}");
    }

    #[test]
    fn aggregates() {
        let h = history(&[("A", &[1.0, 3.0]), ("B", &[]), ("C", &[5.0])]);
        let members = ["A", "B", "C"];
        assert_eq!(GroupAggregate::Pooled.fold(&members, &h), vec![1.0, 3.0, 5.0]);
        assert_eq!(GroupAggregate::BestMember.fold(&members, &h), vec![5.0]);
        assert_eq!(GroupAggregate::MeanOfMembers.fold(&members, &h), vec![2.0, 5.0]);
    }

    #[test]
    fn membership_pairs_build_groups() {
        let s = HierarchicalByAlgorithm::from_membership([
            ("A", "g1"),
            ("C", "g2"),
            ("B", "g1"),
            ("A", "g1"),
        ]);
        assert_eq!(s.groups(), &groups());
        assert_eq!(s.group_of(&"C"), Some(&"g2"));
        assert_eq!(s.group_of(&"Z"), None);
    }
}
