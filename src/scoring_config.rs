use serde::{Deserialize, Serialize};

use crate::best_xi::Slot;
use crate::cohort::{BEST_XI_MIN_MINUTES, PositionCategory};
use crate::error::ScoringError;
use crate::percentile::Direction;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedMetric {
    pub metric: String,
    pub weight: f64,
    pub direction: Direction,
}

/// A named lens on one position group, e.g. a defender's "def" and "att" profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub category: PositionCategory,
    pub name: String,
    pub metrics: Vec<WeightedMetric>,
}

impl ScoringProfile {
    pub fn new(category: PositionCategory, name: &str, weights: &[(&str, f64)]) -> Self {
        Self {
            category,
            name: name.to_string(),
            metrics: weights
                .iter()
                .map(|(metric, weight)| WeightedMetric {
                    metric: metric.to_string(),
                    weight: *weight,
                    direction: Direction::for_metric(metric),
                })
                .collect(),
        }
    }

    /// "Defender_def", "Forward_core", ...
    pub fn key(&self) -> String {
        format!("{}_{}", self.category.label(), self.name)
    }

    pub fn total_weight(&self) -> f64 {
        self.metrics.iter().map(|m| m.weight).sum()
    }
}

/// A run of slots filled from one profile's ranking, best first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotGroup {
    pub label: String,
    pub category: PositionCategory,
    pub profile: String,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub eligibility_minutes: u32,
    pub profiles: Vec<ScoringProfile>,
    /// Processed in order; later groups skip players already placed.
    pub formation: Vec<SlotGroup>,
}

impl ScoringConfig {
    /// The 2024/25 Premier League weights, 4-2-3-1.
    pub fn premier_league() -> Self {
        use PositionCategory::*;

        let profiles = vec![
            ScoringProfile::new(
                Goalkeeper,
                "core",
                &[
                    ("Saves %", 2.0),
                    ("Clean Sheets", 2.5),
                    ("Goals Prevented per90", 1.0),
                    ("Goals Conceded per90", 2.0),
                    ("High Claims per90", 1.0),
                    ("Own Goals per90", 0.5),
                ],
            ),
            ScoringProfile::new(
                Defender,
                "def",
                &[
                    ("Blocks per90", 3.0),
                    ("Possession Won per90", 1.0),
                    ("Tackles per90", 1.9),
                    ("Interceptions per90", 2.0),
                    ("Clearances", 1.4),
                    ("gDuels %", 1.0),
                    ("aDuels %", 1.0),
                    ("Assists per90", 1.0),
                    ("Goals per90", 3.0),
                    ("Passes%", 1.5),
                    ("Passes per90", 2.5),
                ],
            ),
            ScoringProfile::new(
                Defender,
                "att",
                &[
                    ("Assists per90", 4.5),
                    ("Goals per90", 3.0),
                    ("Passes%", 0.5),
                    ("Passes per90", 0.5),
                    ("Blocks per90", 0.5),
                    ("Possession Won per90", 0.5),
                    ("Tackles per90", 0.5),
                    ("Interceptions per90", 0.5),
                    ("gDuels %", 0.5),
                    ("aDuels %", 0.5),
                ],
            ),
            ScoringProfile::new(
                Midfielder,
                "def",
                &[
                    ("Touches per90", 1.0),
                    ("Progressive Carries per90", 5.0),
                    ("Fouls per90", 0.5),
                    ("Shots per90", 0.5),
                    ("Tackles per90", 5.0),
                    ("fThird Passes per90", 1.0),
                    ("Passes%", 4.0),
                    ("Assists per90", 1.0),
                    ("Goals per90", 1.0),
                ],
            ),
            ScoringProfile::new(
                Midfielder,
                "att",
                &[
                    ("Goals per90", 4.0),
                    ("Assists per90", 4.0),
                    ("Shots per90", 2.5),
                    ("Passes%", 1.0),
                    ("Touches per90", 0.5),
                ],
            ),
            ScoringProfile::new(
                Forward,
                "core",
                &[
                    ("Goals per90", 5.0),
                    ("Shots per90", 1.0),
                    ("Assists per90", 1.0),
                    ("Big Chances Missed per90", 0.5),
                ],
            ),
        ];

        let group = |label: &str, category, profile: &str, slots: &[Slot]| SlotGroup {
            label: label.to_string(),
            category,
            profile: profile.to_string(),
            slots: slots.to_vec(),
        };
        let formation = vec![
            group("Goalkeeper", Goalkeeper, "core", &[Slot::GK]),
            group("Defensive defenders", Defender, "def", &[Slot::CB1, Slot::CB2]),
            group("Attacking defenders", Defender, "att", &[Slot::RB, Slot::LB]),
            group("Defensive midfielders", Midfielder, "def", &[Slot::CM1, Slot::CM2]),
            group(
                "Attacking midfielders",
                Midfielder,
                "att",
                &[Slot::RW, Slot::CAM, Slot::LW],
            ),
            group("Striker", Forward, "core", &[Slot::ST]),
        ];

        Self {
            eligibility_minutes: BEST_XI_MIN_MINUTES,
            profiles,
            formation,
        }
    }

    pub fn profile(
        &self,
        category: PositionCategory,
        name: &str,
    ) -> Result<&ScoringProfile, ScoringError> {
        self.profiles
            .iter()
            .find(|p| p.category == category && p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ScoringError::UnknownProfile(format!("{}_{}", category.label(), name)))
    }

    pub fn profiles_for(
        &self,
        category: PositionCategory,
    ) -> impl Iterator<Item = &ScoringProfile> + '_ {
        self.profiles.iter().filter(move |p| p.category == category)
    }

    pub fn slot_count(&self) -> usize {
        self.formation.iter().map(|g| g.slots.len()).sum()
    }

    /// Weights must be positive and every slot group must name an existing profile.
    pub fn validate(&self) -> Result<(), ScoringError> {
        for profile in &self.profiles {
            for m in &profile.metrics {
                if !m.weight.is_finite() || m.weight <= 0.0 {
                    return Err(ScoringError::InvalidWeight {
                        profile: profile.key(),
                        metric: m.metric.clone(),
                        weight: m.weight,
                    });
                }
            }
        }
        for group in &self.formation {
            self.profile(group.category, &group.profile)?;
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::premier_league()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ScoringConfig::premier_league();
        config.validate().expect("default weights should validate");
        assert_eq!(config.slot_count(), 11);
        assert_eq!(config.profiles_for(PositionCategory::Defender).count(), 2);
        assert_eq!(config.profiles_for(PositionCategory::Other).count(), 0);
    }

    #[test]
    fn inverted_metrics_are_flagged() {
        let config = ScoringConfig::premier_league();
        let gk = config.profile(PositionCategory::Goalkeeper, "core").unwrap();
        let conceded = gk
            .metrics
            .iter()
            .find(|m| m.metric == "Goals Conceded per90")
            .unwrap();
        assert_eq!(conceded.direction, Direction::LowerBetter);
        let fwd = config.profile(PositionCategory::Forward, "core").unwrap();
        assert_eq!(
            fwd.metrics.last().map(|m| m.direction),
            Some(Direction::LowerBetter)
        );
        assert_eq!(fwd.key(), "Forward_core");
    }

    #[test]
    fn rejects_non_positive_weight() {
        let mut config = ScoringConfig::premier_league();
        config.profiles[0].metrics[0].weight = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ScoringError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = ScoringConfig::premier_league();
        assert!(matches!(
            config.profile(PositionCategory::Forward, "def"),
            Err(ScoringError::UnknownProfile(_))
        ));
    }
}
