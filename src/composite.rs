use serde::Serialize;

use crate::cohort::{Cohort, eligibility_cohort, usage_cohort_for};
use crate::error::ScoringError;
use crate::player_dataset::PlayerDataset;
use crate::scoring_config::{ScoringConfig, ScoringProfile};

/// Weighted percentile average for one (player, profile) pair, on a 0-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompositeScore {
    pub value: f64,
    /// Metrics that contributed; the rest were unavailable and dropped from the mean.
    pub metrics_used: usize,
    pub weight_used: f64,
}

/// Score `player` (a dataset index) against `cohort` with `profile`.
///
/// Each metric adds `fraction * weight` to the numerator and `weight` to the
/// denominator. A metric missing from the dataset, empty within the cohort, or missing
/// for this player is left out of both, so the remaining weights renormalise.
///
/// Two ways to end up with nothing: no profile metric has any values in the cohort
/// (`NoApplicableMetrics`, the profile does not fit the data), or the cohort has them
/// but this player has none (`MissingPlayerValues`, see [`unscored_as_none`]).
pub fn composite_score(
    cohort: &Cohort<'_>,
    player: usize,
    profile: &ScoringProfile,
) -> Result<CompositeScore, ScoringError> {
    let record = cohort
        .dataset()
        .player(player)
        .ok_or(ScoringError::UnknownPlayer(player))?;
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut metrics_used = 0usize;
    let mut applicable = 0usize;

    for m in &profile.metrics {
        let Ok(column) = cohort.column(&m.metric) else {
            continue;
        };
        applicable += 1;
        let Some(value) = record.metric(&m.metric) else {
            continue;
        };
        weighted_sum += column.fraction(value, m.direction) * m.weight;
        total_weight += m.weight;
        metrics_used += 1;
    }

    if applicable == 0 {
        return Err(ScoringError::NoApplicableMetrics {
            profile: profile.key(),
            category: cohort.category(),
        });
    }
    if total_weight <= 0.0 {
        return Err(ScoringError::MissingPlayerValues {
            profile: profile.key(),
            player: record.name.clone(),
        });
    }

    Ok(CompositeScore {
        value: round2(weighted_sum / total_weight * 10.0).clamp(0.0, 10.0),
        metrics_used,
        weight_used: total_weight,
    })
}

/// Team-of-the-season scoring: the pool is every player of the profile's position
/// with more than the configured eligibility minutes.
pub fn selection_score(
    dataset: &PlayerDataset,
    config: &ScoringConfig,
    player: usize,
    profile: &ScoringProfile,
) -> Result<CompositeScore, ScoringError> {
    let cohort = eligibility_cohort(dataset, profile.category, config.eligibility_minutes);
    composite_score(&cohort, player, profile)
}

/// Player-vs-player scoring: the pool is the player's position and usage bucket,
/// widened to the whole position when the bucket is too small.
pub fn comparison_score(
    dataset: &PlayerDataset,
    player: usize,
    profile: &ScoringProfile,
) -> Result<CompositeScore, ScoringError> {
    let cohort = usage_cohort_for(dataset, player).ok_or(ScoringError::UnknownPlayer(player))?;
    composite_score(&cohort, player, profile)
}

/// A player with no values for the profile reads as `None` (shown as N/A); any other
/// error still propagates.
pub fn unscored_as_none(
    result: Result<CompositeScore, ScoringError>,
) -> Result<Option<CompositeScore>, ScoringError> {
    match result {
        Ok(score) => Ok(Some(score)),
        Err(ScoringError::MissingPlayerValues { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
