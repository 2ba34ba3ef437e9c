use serde::Serialize;

use crate::cohort::{Cohort, PositionCategory, UsageBucket, usage_cohort_for};
use crate::composite::{comparison_score, unscored_as_none};
use crate::error::{NotAvailable, ScoringError};
use crate::percentile::Direction;
use crate::player_dataset::{PlayerDataset, PlayerRecord};
use crate::scoring_config::ScoringConfig;

/// Metrics shown on a player's analysis card.
pub fn key_metrics(category: PositionCategory) -> &'static [&'static str] {
    match category {
        PositionCategory::Goalkeeper => &[
            "Saves",
            "Saves %",
            "Penalties Saved",
            "Goals Prevented",
            "Clean Sheets",
            "Punches",
            "High Claims",
            "Goals Conceded",
            "Own Goals",
        ],
        PositionCategory::Defender => &[
            "Tackles",
            "Interceptions",
            "Blocks",
            "Clearances",
            "Possession Won",
            "gDuels %",
            "aDuels %",
            "Goals",
            "Assists",
            "Passes",
            "Passes%",
            "Own Goals",
        ],
        PositionCategory::Midfielder => &[
            "Goals",
            "Assists",
            "Touches",
            "Shots",
            "Passes",
            "Passes%",
            "Through Balls",
            "Progressive Carries",
            "fThird Passes",
            "fThird Passes %",
            "Tackles",
            "Interceptions",
            "gDuels %",
            "aDuels %",
            "Fouls",
        ],
        PositionCategory::Forward => &[
            "Goals",
            "Assists",
            "Shots",
            "Conversion %",
            "Big Chances Missed",
            "Hit Woodwork",
            "Passes",
            "Passes%",
            "fThird Passes",
            "fThird Passes %",
        ],
        PositionCategory::Other => &[],
    }
}

/// Metrics plotted on the head-to-head radar.
pub fn radar_metrics(category: PositionCategory) -> &'static [&'static str] {
    match category {
        PositionCategory::Goalkeeper => &[
            "Saves %",
            "Clean Sheets",
            "Goals Prevented",
            "Goals Conceded",
            "High Claims",
        ],
        PositionCategory::Defender => &[
            "Tackles",
            "Interceptions",
            "Blocks",
            "gDuels %",
            "aDuels %",
            "Passes%",
            "Goals",
            "Assists",
        ],
        PositionCategory::Midfielder => &[
            "Goals",
            "Assists",
            "Shots",
            "fThird Passes",
            "Passes%",
            "Touches",
            "Progressive Carries",
            "Through Balls",
            "Fouls",
        ],
        PositionCategory::Forward => &[
            "Goals",
            "Shots",
            "Assists",
            "Passes%",
            "Conversion %",
            "Big Chances Missed",
        ],
        PositionCategory::Other => &[],
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricReading {
    pub metric: String,
    pub label: String,
    pub value: Option<f64>,
    pub percentile: Result<u8, NotAvailable>,
}

impl MetricReading {
    /// "0.45 (P80)", or "- (PN/A)" when there is nothing to rank.
    pub fn display(&self) -> String {
        let value = self
            .value
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string());
        match self.percentile {
            Ok(p) => format!("{value} (P{p})"),
            Err(_) => format!("{value} (PN/A)"),
        }
    }

    /// Radar axis value in `[0, 1]`; unavailable readings plot at the centre.
    pub fn radar_value(&self) -> f64 {
        self.percentile.map(|p| p as f64 / 100.0).unwrap_or(0.0)
    }
}

/// Reads `metric` for `player` against `cohort`, using the per-90 column when the
/// dataset has one.
pub fn reading_in(cohort: &Cohort<'_>, player: &PlayerRecord, metric: &str) -> MetricReading {
    let dataset = cohort.dataset();
    let Some(column) = dataset.resolve_column(metric) else {
        return MetricReading {
            metric: metric.to_string(),
            label: metric.to_string(),
            value: None,
            percentile: Err(NotAvailable::MissingMetric),
        };
    };
    let label = if column == metric {
        metric.to_string()
    } else {
        format!("{metric} (per90)")
    };
    let value = player.metric(&column);
    MetricReading {
        metric: metric.to_string(),
        label,
        value,
        percentile: cohort.percentile(&column, value, Direction::for_metric(metric)),
    }
}

/// One metric for one player, ranked within their position and usage bucket.
pub fn metric_reading(
    dataset: &PlayerDataset,
    player: usize,
    metric: &str,
) -> Result<MetricReading, ScoringError> {
    let record = dataset.player(player).ok_or(ScoringError::UnknownPlayer(player))?;
    let cohort = usage_cohort_for(dataset, player).ok_or(ScoringError::UnknownPlayer(player))?;
    Ok(reading_in(&cohort, record, metric))
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    pub name: String,
    pub club: String,
    pub nationality: String,
    pub category: PositionCategory,
    pub bucket: UsageBucket,
    pub minutes: u32,
    pub appearances: Option<f64>,
    pub yellow_cards: Option<f64>,
    pub red_cards: Option<f64>,
    pub cohort_size: usize,
    pub cohort_relaxed: bool,
    pub readings: Vec<MetricReading>,
}

pub fn player_report(dataset: &PlayerDataset, player: usize) -> Result<PlayerReport, ScoringError> {
    let record = dataset.player(player).ok_or(ScoringError::UnknownPlayer(player))?;
    let cohort = usage_cohort_for(dataset, player).ok_or(ScoringError::UnknownPlayer(player))?;
    let category = record.category();
    let readings = key_metrics(category)
        .iter()
        .map(|metric| reading_in(&cohort, record, metric))
        .collect();

    Ok(PlayerReport {
        name: record.name.clone(),
        club: record.club.clone(),
        nationality: record.nationality.clone(),
        category,
        bucket: record.usage_bucket(),
        minutes: record.minutes,
        appearances: record.metric("Appearances"),
        yellow_cards: record.metric("Yellow Cards"),
        red_cards: record.metric("Red Cards"),
        cohort_size: cohort.len(),
        cohort_relaxed: cohort.relaxed(),
        readings,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparedPlayer {
    pub name: String,
    pub club: String,
    pub bucket: UsageBucket,
    pub readings: Vec<MetricReading>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileScorePair {
    pub profile: String,
    /// `None` when that player has no values for the profile.
    pub left: Option<f64>,
    pub right: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub category: PositionCategory,
    pub left: ComparedPlayer,
    pub right: ComparedPlayer,
    pub profile_scores: Vec<ProfileScorePair>,
}

/// Head-to-head on the radar metrics plus every scoring profile of the shared
/// position. Each side is ranked within its own usage cohort.
pub fn compare_players(
    dataset: &PlayerDataset,
    config: &ScoringConfig,
    left: usize,
    right: usize,
) -> Result<Comparison, ScoringError> {
    let left_record = dataset.player(left).ok_or(ScoringError::UnknownPlayer(left))?;
    let right_record = dataset.player(right).ok_or(ScoringError::UnknownPlayer(right))?;
    let category = left_record.category();
    if right_record.category() != category {
        return Err(ScoringError::PositionMismatch {
            left: category,
            right: right_record.category(),
        });
    }

    let side = |index: usize, record: &PlayerRecord| -> Result<ComparedPlayer, ScoringError> {
        let cohort = usage_cohort_for(dataset, index).ok_or(ScoringError::UnknownPlayer(index))?;
        Ok(ComparedPlayer {
            name: record.name.clone(),
            club: record.club.clone(),
            bucket: record.usage_bucket(),
            readings: radar_metrics(category)
                .iter()
                .map(|metric| reading_in(&cohort, record, metric))
                .collect(),
        })
    };

    let mut profile_scores = Vec::new();
    for profile in config.profiles_for(category) {
        profile_scores.push(ProfileScorePair {
            profile: profile.key(),
            left: unscored_as_none(comparison_score(dataset, left, profile))?.map(|s| s.value),
            right: unscored_as_none(comparison_score(dataset, right, profile))?.map(|s| s.value),
        });
    }

    Ok(Comparison {
        category,
        left: side(left, left_record)?,
        right: side(right, right_record)?,
        profile_scores,
    })
}

/// Players of `club` a given player can be compared with: same position, same usage
/// bucket, not the player themselves.
pub fn comparison_candidates(dataset: &PlayerDataset, player: usize, club: &str) -> Vec<usize> {
    let Some(record) = dataset.player(player) else {
        return Vec::new();
    };
    let category = record.category();
    let bucket = record.usage_bucket();
    dataset
        .players()
        .iter()
        .enumerate()
        .filter(|(idx, p)| {
            *idx != player
                && p.club.trim().eq_ignore_ascii_case(club.trim())
                && p.category() == category
                && p.usage_bucket() == bucket
        })
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midfielders() -> PlayerDataset {
        let players = (0..6)
            .map(|i| {
                let club = if i < 3 { "Arsenal" } else { "Chelsea" };
                PlayerRecord::new(format!("M{i}"), club, "ENG", "MID", 1800)
                    .with_metric("Goals", i as f64)
                    .with_metric("Fouls", i as f64)
                    .with_metric("Passes%", 80.0 + i as f64)
            })
            .collect();
        PlayerDataset::from_players(players)
    }

    #[test]
    fn reading_uses_rate_column_and_label() {
        let ds = midfielders();
        let reading = metric_reading(&ds, 5, "Goals").unwrap();
        assert_eq!(reading.label, "Goals (per90)");
        assert_eq!(reading.percentile, Ok(100));
        let passes = metric_reading(&ds, 5, "Passes%").unwrap();
        assert_eq!(passes.label, "Passes%");
        assert_eq!(passes.display(), "85.00 (P100)");
    }

    #[test]
    fn fouls_are_inverted() {
        let ds = midfielders();
        let reading = metric_reading(&ds, 0, "Fouls").unwrap();
        // lowest of six: rank 1/6 -> P16, inverted P84
        assert_eq!(reading.percentile, Ok(84));
    }

    #[test]
    fn missing_metric_reads_na() {
        let ds = midfielders();
        let reading = metric_reading(&ds, 0, "Through Balls").unwrap();
        assert_eq!(reading.percentile, Err(NotAvailable::MissingMetric));
        assert_eq!(reading.display(), "- (PN/A)");
        assert_eq!(reading.radar_value(), 0.0);
    }

    #[test]
    fn candidates_share_position_and_bucket() {
        let mut players: Vec<PlayerRecord> = midfielders().players().to_vec();
        players.push(PlayerRecord::new("Kid", "Chelsea", "ENG", "MID", 200));
        players.push(PlayerRecord::new("Keeper", "Chelsea", "ENG", "GKP", 1800));
        let ds = PlayerDataset::from_players(players);
        assert_eq!(comparison_candidates(&ds, 0, "chelsea"), vec![3, 4, 5]);
        assert_eq!(comparison_candidates(&ds, 0, "Arsenal"), vec![1, 2]);
    }

    #[test]
    fn comparing_across_positions_fails() {
        let mut players: Vec<PlayerRecord> = midfielders().players().to_vec();
        players.push(PlayerRecord::new("Keeper", "Chelsea", "ENG", "GKP", 1800));
        let ds = PlayerDataset::from_players(players);
        let config = ScoringConfig::premier_league();
        assert!(matches!(
            compare_players(&ds, &config, 0, 6),
            Err(ScoringError::PositionMismatch { .. })
        ));
    }
}
