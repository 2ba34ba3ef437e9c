use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};

use pl_tots::best_xi::{BestXi, rank_profile, select_best_xi};
use pl_tots::cohort::PositionCategory;
use pl_tots::composite::{comparison_score, selection_score, unscored_as_none};
use pl_tots::player_dataset::{PlayerDataset, load_players_csv};
use pl_tots::player_report::{
    Comparison, PlayerReport, compare_players, comparison_candidates, player_report,
};
use pl_tots::scoring_config::ScoringConfig;
use pl_tots::tots_export::export_tots_workbook;

const DEFAULT_DATA_PATH: &str = "data/players_data/epl_player_stats_2024_25.csv";
const VALUE_FLAGS: [&str; 4] = ["--data", "--xlsx", "--club", "--vs-club"];

const USAGE: &str = "usage: pl_tots [--data PATH] [--json] <command>

commands:
  tots [--xlsx PATH]                    team of the season (default)
  rank <position> <profile>             full ranking for one profile, e.g. rank defender att
  player <name> [--club CLUB]           key metrics with percentiles
  score <name> [--club CLUB]            composite score for every profile of the position
  compare <name> <name> [--club CLUB] [--vs-club CLUB]
  compare <name> --vs-club CLUB         list comparable players at CLUB
  config                                print scoring weights";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{USAGE}");
        return Ok(());
    }
    let json = args.iter().any(|a| a == "--json");
    let positional = positional_args(&args);

    let config = ScoringConfig::premier_league();
    config.validate()?;

    let command = positional.first().map(String::as_str).unwrap_or("tots");
    if command == "config" {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let data_path = flag_value(&args, "--data")
        .or_else(|| std::env::var("PL_TOTS_DATA").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
    let dataset = load_players_csv(&data_path)?;

    match command {
        "tots" => {
            let xi = select_best_xi(&dataset, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&xi)?);
            } else {
                print_best_xi(&xi);
            }
            let export = flag_value(&args, "--xlsx")
                .or_else(|| std::env::var("PL_TOTS_EXPORT").ok());
            if let Some(path) = export {
                let path = PathBuf::from(path);
                let report = export_tots_workbook(&path, &dataset, &config, &xi)?;
                println!(
                    "Exported {} slots, {} rankings ({} rows) and {} weights to {}",
                    report.slots,
                    report.rankings,
                    report.ranked_rows,
                    report.weight_rows,
                    path.display()
                );
            }
        }
        "rank" => {
            let position = positional.get(1).context("rank needs a position")?;
            let category = PositionCategory::parse(position)
                .ok_or_else(|| anyhow!("unknown position '{position}'"))?;
            let profile_name = positional.get(2).map(String::as_str).unwrap_or("core");
            let profile = config.profile(category, profile_name)?;
            let ranked = rank_profile(&dataset, &config, profile)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else {
                println!("{} ({} eligible)", profile.key(), ranked.len());
                for (pos, entry) in ranked.iter().enumerate() {
                    println!(
                        "{:>3}. {:<28} {:<20} {:>5.2}",
                        pos + 1,
                        entry.name,
                        entry.club,
                        entry.score
                    );
                }
            }
        }
        "player" => {
            let name = positional.get(1).context("player needs a name")?;
            let idx = lookup(&dataset, name, flag_value(&args, "--club").as_deref())?;
            let report = player_report(&dataset, idx)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        "score" => {
            let name = positional.get(1).context("score needs a name")?;
            let idx = lookup(&dataset, name, flag_value(&args, "--club").as_deref())?;
            let Some(player) = dataset.player(idx) else {
                bail!("no player at row {idx}");
            };
            let eligible = player.minutes > config.eligibility_minutes;
            println!("{} ({}, {} min)", player.name, player.club, player.minutes);
            for profile in config.profiles_for(player.category()) {
                let usage = unscored_as_none(comparison_score(&dataset, idx, profile))?;
                if eligible {
                    let selection =
                        unscored_as_none(selection_score(&dataset, &config, idx, profile))?;
                    println!(
                        "  {:<24} {:>6} vs usage group  {:>6} vs TOTS pool",
                        profile.key(),
                        opt_score(usage.map(|s| s.value)),
                        opt_score(selection.map(|s| s.value))
                    );
                } else {
                    println!(
                        "  {:<24} {:>6} vs usage group",
                        profile.key(),
                        opt_score(usage.map(|s| s.value))
                    );
                }
            }
            if !eligible {
                println!(
                    "  not eligible for the team of the season (<= {} min)",
                    config.eligibility_minutes
                );
            }
        }
        "compare" => {
            let left = positional.get(1).context("compare needs a name")?;
            let left = lookup(&dataset, left, flag_value(&args, "--club").as_deref())?;
            let vs_club = flag_value(&args, "--vs-club");
            let Some(right) = positional.get(2) else {
                let club = vs_club.context("compare needs a second name or --vs-club")?;
                let candidates = comparison_candidates(&dataset, left, &club);
                if candidates.is_empty() {
                    println!("no comparable players at {club}");
                }
                for idx in candidates {
                    if let Some(p) = dataset.player(idx) {
                        println!("  {:<28} {:>5} min", p.name, p.minutes);
                    }
                }
                return Ok(());
            };
            let right = lookup(&dataset, right, vs_club.as_deref())?;
            let comparison = compare_players(&dataset, &config, left, right)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                print_comparison(&comparison);
            }
        }
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }

    Ok(())
}

fn lookup(dataset: &PlayerDataset, name: &str, club: Option<&str>) -> Result<usize> {
    dataset.find_player(name, club).ok_or_else(|| match club {
        Some(club) => anyhow!("no player named '{name}' at {club}"),
        None => anyhow!("no player named '{name}'"),
    })
}

fn print_best_xi(xi: &BestXi) {
    println!("Team of the Season (4-2-3-1)");
    for slot in &xi.slots {
        println!(
            "{:<4} {:<28} {:<20} {:>5.2}  [{}]",
            slot.slot.label(),
            slot.name,
            slot.club,
            slot.score,
            slot.profile
        );
    }
}

fn print_report(report: &PlayerReport) {
    println!("{} - {} ({})", report.name, report.category.label(), report.club);
    println!(
        "Nationality: {} | Minutes: {} | Appearances: {} | Yellow: {} | Red: {}",
        report.nationality,
        report.minutes,
        opt_count(report.appearances),
        opt_count(report.yellow_cards),
        opt_count(report.red_cards)
    );
    println!("{}", report.bucket.description());
    if report.cohort_relaxed {
        println!(
            "(too few players in this bucket, compared with all {} at the position)",
            report.cohort_size
        );
    }
    for reading in &report.readings {
        println!("  {:<28} {}", reading.label, reading.display());
    }
}

fn print_comparison(cmp: &Comparison) {
    println!(
        "{} ({}) vs {} ({}) - {}",
        cmp.left.name,
        cmp.left.club,
        cmp.right.name,
        cmp.right.club,
        cmp.category.label()
    );
    for (l, r) in cmp.left.readings.iter().zip(&cmp.right.readings) {
        println!("  {:<24} {:>16} {:>16}", l.metric, l.display(), r.display());
    }
    for pair in &cmp.profile_scores {
        println!(
            "  {:<24} {:>16} {:>16}",
            pair.profile,
            opt_score(pair.left),
            opt_score(pair.right)
        );
    }
}

fn opt_score(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "N/A".to_string())
}

fn opt_count(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.0}")).unwrap_or_else(|| "-".to_string())
}

/// `--flag=value` or `--flag value`.
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.clone());
            }
        }
    }
    None
}

fn positional_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(arg.clone());
    }
    out
}
