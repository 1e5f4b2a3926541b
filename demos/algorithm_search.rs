use banditsel::{
    stable_hash64, GroupAggregate, HierarchicalConfig, ScoreHistory, Selector, SelectorConfig,
    ShortlistConfig, Uniform,
};
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

/// Simulated trial: a fixed per-tuner quality, a slow warm-up, and deterministic noise.
fn trial(tuner: &str, pulls: usize, round: usize) -> f64 {
    let base = match tuner {
        "gp-ei" => 0.78,
        "gp-ucb" => 0.74,
        "tpe" => 0.70,
        "grid-fine" => 0.55,
        "grid-coarse" => 0.40,
        _ => 0.30,
    };
    let warmup = 0.1 * (1.0 - (-(pulls as f64) / 5.0).exp());
    let noise = ((stable_hash64(round as u64, tuner) % 1_000) as f64 / 1_000.0 - 0.5) * 0.08;
    base + warmup + noise
}

fn run(name: &str, selector: &dyn Selector<String>, tuners: &[String], rounds: usize) {
    let mut h = ScoreHistory::new();
    let mut explored = 0usize;
    for round in 0..rounds {
        let d = match selector.decide(tuners, &h) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("{name}: {e}");
                return;
            }
        };
        if d.explored() {
            explored += 1;
        }
        let score = trial(&d.chosen, h.len_of(&d.chosen), round);
        h.record(d.chosen, score);
    }

    let best = h
        .iter()
        .flat_map(|(_, xs)| xs.iter().copied())
        .fold(f64::NEG_INFINITY, f64::max);
    let pulls: Vec<String> = tuners
        .iter()
        .map(|t| format!("{t}={}", h.len_of(t)))
        .collect();
    eprintln!(
        "{name:<22} best={best:.3} explored={explored:<3} pulls: {}",
        pulls.join(" ")
    );
}

fn main() {
    // Per-decision logs: RUST_LOG=banditsel=debug (or =trace for per-candidate scores).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let tuners: Vec<String> = ["gp-ei", "gp-ucb", "tpe", "grid-fine", "grid-coarse", "random"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rounds = 120;

    let configs = [
        SelectorConfig::Uniform(Uniform::with_seed(42)),
        SelectorConfig::default(),
        SelectorConfig::BestKReward(ShortlistConfig::new(3)),
        SelectorConfig::BestKVelocity(ShortlistConfig::new(3)),
        SelectorConfig::RecentKReward(ShortlistConfig {
            window: Some(5),
            ..ShortlistConfig::new(2)
        }),
        SelectorConfig::RecentKVelocity(ShortlistConfig::new(3)),
        SelectorConfig::PureBestKVelocity(ShortlistConfig::new(2)),
    ];
    for cfg in configs {
        match cfg.build::<String>() {
            Ok(s) => run(cfg.policy().as_str(), s.as_ref(), &tuners, rounds),
            Err(e) => eprintln!("{}: {e}", cfg.policy()),
        }
    }

    let groups: BTreeMap<String, Vec<String>> = BTreeMap::from([
        ("gp".to_string(), vec!["gp-ei".to_string(), "gp-ucb".to_string()]),
        ("tpe".to_string(), vec!["tpe".to_string()]),
        (
            "grid".to_string(),
            vec!["grid-fine".to_string(), "grid-coarse".to_string()],
        ),
        ("random".to_string(), vec!["random".to_string()]),
    ]);
    let hier = HierarchicalConfig {
        stage2: SelectorConfig::BestKReward(ShortlistConfig::new(1)),
        aggregate: GroupAggregate::BestMember,
        ..HierarchicalConfig::default()
    };
    match hier.build(groups) {
        Ok(s) => run("hierarchical_by_algorithm", &s, &tuners, rounds),
        Err(e) => eprintln!("hierarchical_by_algorithm: {e}"),
    }
}
