use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

use pl_tots::best_xi::{rank_profile, select_best_xi};
use pl_tots::cohort::PositionCategory;
use pl_tots::percentile::{Direction, percentile};
use pl_tots::player_dataset::{PlayerDataset, PlayerRecord};
use pl_tots::player_report::player_report;
use pl_tots::scoring_config::ScoringConfig;

const COUNTING: [&str; 20] = [
    "Goals",
    "Assists",
    "Shots",
    "Touches",
    "Passes",
    "Progressive Carries",
    "fThird Passes",
    "Tackles",
    "Interceptions",
    "Blocks",
    "Clearances",
    "Possession Won",
    "Fouls",
    "Saves",
    "Goals Conceded",
    "Own Goals",
    "High Claims",
    "Goals Prevented",
    "Big Chances Missed",
    "Clean Sheets",
];
const RATES: [&str; 4] = ["Passes%", "gDuels %", "aDuels %", "Saves %"];

/// A league-sized season: roughly 560 players spread over the four positions.
fn synthetic_season(seed: u64) -> PlayerDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let positions = ["GKP", "DEF", "DEF", "DEF", "MID", "MID", "MID", "FWD"];
    let players = (0..560)
        .map(|i| {
            let position = positions[i % positions.len()];
            let mut player = PlayerRecord::new(
                format!("Player {i}"),
                format!("Club {}", i % 20),
                "ENG",
                position,
                rng.gen_range(0..3420),
            );
            for metric in COUNTING {
                player = player.with_metric(metric, rng.gen_range(0.0..120.0));
            }
            for metric in RATES {
                player = player.with_metric(metric, rng.gen_range(30.0..95.0));
            }
            player
        })
        .collect();
    PlayerDataset::from_players(players)
}

fn bench_percentile(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let values: Vec<f64> = (0..200).map(|_| rng.gen_range(0.0..1.0)).collect();
    c.bench_function("percentile_200", |b| {
        b.iter(|| {
            let p = percentile(black_box(&values), Some(0.42), Direction::HigherBetter).unwrap();
            black_box(p);
        })
    });
}

fn bench_rank_profile(c: &mut Criterion) {
    let ds = synthetic_season(7);
    let config = ScoringConfig::premier_league();
    let profile = config.profile(PositionCategory::Midfielder, "def").unwrap();
    c.bench_function("rank_profile_midfield_def", |b| {
        b.iter(|| {
            let ranked = rank_profile(black_box(&ds), &config, profile).unwrap();
            black_box(ranked.len());
        })
    });
}

fn bench_select_best_xi(c: &mut Criterion) {
    let ds = synthetic_season(7);
    let config = ScoringConfig::premier_league();
    c.bench_function("select_best_xi", |b| {
        b.iter(|| {
            let xi = select_best_xi(black_box(&ds), &config).unwrap();
            black_box(xi.slots.len());
        })
    });
}

fn bench_player_report(c: &mut Criterion) {
    let ds = synthetic_season(7);
    c.bench_function("player_report", |b| {
        b.iter(|| {
            let report = player_report(black_box(&ds), 4).unwrap();
            black_box(report.readings.len());
        })
    });
}

criterion_group!(
    benches,
    bench_percentile,
    bench_rank_profile,
    bench_select_best_xi,
    bench_player_report
);
criterion_main!(benches);
