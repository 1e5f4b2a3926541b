//! End-to-end search-loop scenarios: a driver repeatedly asks a selector for a
//! choice, "runs a trial" with a deterministic simulated reward, and appends
//! the score.

use std::collections::BTreeMap;

use banditsel::{
    BestKReward, BestKVelocity, Decision, DecisionNote, Fallback, GroupAggregate,
    HierarchicalByAlgorithm, HierarchicalConfig, Policy, PureBestKVelocity, RecentKReward,
    RecentKVelocity, ScoreHistory, Selector, SelectorConfig, ShortlistConfig, Ucb1, Uniform,
};

/// Deterministic pseudo-noise in `[-0.05, 0.05]`.
fn jitter(round: usize, salt: u64) -> f64 {
    let h = banditsel::stable_hash64(salt, &round.to_string());
    ((h % 1_000) as f64 / 1_000.0 - 0.5) * 0.1
}

fn run<S: Selector<String> + ?Sized>(
    selector: &S,
    arms: &[String],
    rounds: usize,
    reward: impl Fn(&str, usize) -> f64,
) -> (ScoreHistory<String>, Vec<Decision<String>>) {
    let mut h = ScoreHistory::new();
    let mut log = Vec::with_capacity(rounds);
    for round in 0..rounds {
        let d = selector.decide(arms, &h).expect("valid inputs");
        assert!(arms.contains(&d.chosen), "round {round}: {} not a candidate", d.chosen);
        h.record(d.chosen.clone(), reward(&d.chosen, round));
        log.push(d);
    }
    (h, log)
}

fn arms(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn stationary(arm: &str, round: usize) -> f64 {
    let base = match arm {
        "gp" => 0.8,
        "tpe" => 0.6,
        "grid" => 0.3,
        _ => 0.1,
    };
    base + jitter(round, arm.len() as u64)
}

#[test]
fn ucb1_tries_every_arm_then_concentrates_on_best() {
    let a = arms(&["gp", "tpe", "grid", "random"]);
    let (h, log) = run(&Ucb1::default(), &a, 300, stationary);
    // Cold start: the first four rounds visit each arm once.
    let first: Vec<&str> = log[..4].iter().map(|d| d.chosen.as_str()).collect();
    let mut sorted = first.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec!["gp", "grid", "random", "tpe"]);
    assert!(log[..4].iter().all(Decision::explored));

    let best = h.len_of(&"gp".to_string());
    for other in ["tpe", "grid", "random"] {
        assert!(best > h.len_of(&other.to_string()), "gp={best} vs {other}");
    }
}

#[test]
fn ucb1_explores_then_scores_by_upper_bound() {
    let a = arms(&["A", "B", "C"]);
    let mut h: ScoreHistory<String> = [
        ("A".to_string(), vec![1.0, 1.0, 1.0]),
        ("B".to_string(), vec![]),
        ("C".to_string(), vec![5.0]),
    ]
    .into_iter()
    .collect();
    let u = Ucb1::default();
    assert_eq!(u.select(&a, &h).unwrap(), "B");

    h.record("B".to_string(), 0.0);
    let total = h.total_observations(&a);
    assert_eq!(total, 5);
    assert_eq!(u.select(&a, &h).unwrap(), "C");
    let score = |c: &str| {
        let xs = h.scores(&c.to_string());
        xs.iter().sum::<f64>() / xs.len() as f64
            + (2.0 * (total as f64).ln() / xs.len() as f64).sqrt()
    };
    let expected = ["A", "B", "C"]
        .into_iter()
        .max_by(|x, y| score(x).total_cmp(&score(y)))
        .unwrap();
    assert_eq!(u.select(&a, &h).unwrap(), expected);
}

#[test]
fn best_k_reward_never_leaves_shortlist() {
    let a = arms(&["gp", "tpe", "grid", "random"]);
    let s = BestKReward::new(2).unwrap();
    let (h, log) = run(&s, &a, 200, stationary);
    // After cold start, the two weakest arms are outside the top-2 and stop being tried.
    for d in &log[4..] {
        let top = d.shortlist().unwrap();
        assert!(top.contains(&d.chosen));
    }
    assert_eq!(h.len_of(&"random".to_string()), 1);
    assert_eq!(h.len_of(&"grid".to_string()), 1);
}

#[test]
fn best_k_velocity_follows_improving_arm() {
    // "warming" starts low but keeps improving; "plateau" is flat.
    let reward = |arm: &str, round: usize| match arm {
        "warming" => 0.1 + 0.002 * round as f64,
        "plateau" => 0.5,
        _ => 0.2,
    };
    let a = arms(&["plateau", "warming", "static"]);
    let (h, _) = run(&BestKVelocity::new(1).unwrap(), &a, 60, reward);
    assert!(h.len_of(&"warming".to_string()) > h.len_of(&"plateau".to_string()));
}

#[test]
fn recent_k_adapts_to_regime_change() {
    // "early" is best for 40 rounds then collapses; "late" is steady.
    let reward = |arm: &str, round: usize| match (arm, round < 40) {
        ("early", true) => 0.9,
        ("early", false) => 0.0,
        ("late", _) => 0.5,
        _ => 0.1,
    };
    let a = arms(&["early", "late", "other"]);
    let recent = RecentKReward::new(1).unwrap().with_window(3).unwrap();
    let (_, log) = run(&recent, &a, 80, reward);
    let tail_early = log[60..].iter().filter(|d| d.chosen == "early").count();
    assert!(tail_early <= 2, "recent-window ranking kept picking early: {tail_early}");
}

#[test]
fn recent_k_velocity_and_pure_are_in_top_k() {
    let a = arms(&["gp", "tpe", "grid", "random"]);
    let selectors: Vec<Box<dyn Selector<String>>> = vec![
        Box::new(RecentKVelocity::new(3).unwrap()),
        Box::new(PureBestKVelocity::new(2).unwrap()),
        Box::new(
            BestKReward::new(3)
                .unwrap()
                .with_fallback(Fallback::Uniform(Uniform::with_seed(8))),
        ),
    ];
    for s in &selectors {
        let (_, log) = run(s.as_ref(), &a, 50, stationary);
        for d in &log {
            assert!(d.shortlist().unwrap().contains(&d.chosen));
        }
    }
}

#[test]
fn pure_velocity_never_reports_exploration() {
    let a = arms(&["gp", "tpe", "grid"]);
    let (_, log) = run(&PureBestKVelocity::new(2).unwrap(), &a, 30, stationary);
    assert!(log.iter().all(|d| !d.explored()));
    assert!(log.iter().all(|d| d.policy == Policy::PureBestKVelocity));
}

#[test]
fn uniform_is_reproducible_across_runs() {
    let a = arms(&["gp", "tpe", "grid", "random"]);
    let (_, log1) = run(&Uniform::with_seed(99), &a, 40, stationary);
    let (_, log2) = run(&Uniform::with_seed(99), &a, 40, stationary);
    let picks = |log: &[Decision<String>]| log.iter().map(|d| d.chosen.clone()).collect::<Vec<_>>();
    assert_eq!(picks(&log1), picks(&log2));
    let (_, log3) = run(&Uniform::with_seed(100), &a, 40, stationary);
    assert_ne!(picks(&log1), picks(&log3));
}

#[test]
fn hierarchical_prefers_stronger_algorithm_family() {
    let groups: BTreeMap<String, Vec<String>> = BTreeMap::from([
        ("gp".to_string(), arms(&["gp-ei", "gp-ucb"])),
        ("grid".to_string(), arms(&["grid-coarse", "grid-fine"])),
    ]);
    let reward = |arm: &str, round: usize| {
        let base = if arm.starts_with("gp") { 0.8 } else { 0.3 };
        base + jitter(round, 3)
    };
    let s = HierarchicalByAlgorithm::new(groups);
    let a = arms(&["gp-ei", "gp-ucb", "grid-coarse", "grid-fine"]);
    let (h, log) = run(&s, &a, 200, reward);
    let gp: usize = ["gp-ei", "gp-ucb"].iter().map(|c| h.len_of(&c.to_string())).sum();
    assert!(gp > 150, "gp family got {gp} of 200");
    for d in &log {
        assert!(matches!(d.notes.first(), Some(DecisionNote::GroupChosen { .. })));
    }
}

#[test]
fn hierarchical_from_config_with_best_member_aggregate() {
    let groups = BTreeMap::from([
        (1u32, vec![10u32, 11, 12]),
        (2u32, vec![20u32]),
    ]);
    let cfg = HierarchicalConfig {
        stage1: SelectorConfig::Ucb1(Ucb1::default()),
        stage2: SelectorConfig::BestKReward(ShortlistConfig::new(1)),
        aggregate: GroupAggregate::BestMember,
    };
    let s = cfg.build(groups).unwrap();
    let h: ScoreHistory<u32> = [
        (10, vec![0.1, 0.1]),
        (11, vec![0.9, 0.9]),
        (12, vec![0.2, 0.2]),
        (20, vec![0.3, 0.3]),
    ]
    .into_iter()
    .collect();
    // Group 1's best member (11) dominates group 2; stage 2 shortlists the best member.
    let d = s.decide(&[10, 11, 12, 20], &h).unwrap();
    assert_eq!(d.chosen, 11);
    assert_eq!(d.eligible, vec![10, 11, 12]);
}

#[test]
fn recent_k_velocity_config_matches_direct_construction() {
    let a = arms(&["gp", "tpe", "grid"]);
    let cfg = SelectorConfig::RecentKVelocity(ShortlistConfig {
        window: Some(4),
        ..ShortlistConfig::new(2)
    });
    let from_cfg = cfg.build::<String>().unwrap();
    let direct = RecentKVelocity::new(2).unwrap().with_window(4).unwrap();
    let (_, l1) = run(from_cfg.as_ref(), &a, 40, stationary);
    let (_, l2) = run(&direct, &a, 40, stationary);
    assert_eq!(l1, l2);
}
